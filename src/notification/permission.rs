use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Denied,
}

/// Host authorization API. `request_status` may prompt the user.
#[async_trait]
pub trait PermissionBackend: Send + Sync + 'static {
    async fn get_status(&self) -> PermissionStatus;

    async fn request_status(&self) -> PermissionDecision;
}

/// Boolean gate over the host permission API. Checked once at startup; the
/// scheduler never consults it, since a denied host turns schedule calls
/// into delivery no-ops on its own.
pub struct PermissionGate<TBackend> {
    backend: TBackend,
}

impl<TBackend: PermissionBackend> PermissionGate<TBackend> {
    pub fn new(backend: TBackend) -> Self {
        Self { backend }
    }

    /// Idempotent: prompts at most when the status is still undetermined.
    pub async fn ensure_granted(&self) -> PermissionDecision {
        match self.backend.get_status().await {
            PermissionStatus::Granted => PermissionDecision::Granted,
            PermissionStatus::Denied => PermissionDecision::Denied,
            PermissionStatus::Undetermined => self.backend.request_status().await,
        }
    }
}

/// Permission backend with a fixed answer, used by the binary and in tests.
pub struct StaticPermissionBackend {
    status: PermissionStatus,
}

impl StaticPermissionBackend {
    pub fn new(status: PermissionStatus) -> Self {
        Self { status }
    }
}

#[async_trait]
impl PermissionBackend for StaticPermissionBackend {
    async fn get_status(&self) -> PermissionStatus {
        self.status
    }

    async fn request_status(&self) -> PermissionDecision {
        match self.status {
            PermissionStatus::Denied => PermissionDecision::Denied,
            _ => PermissionDecision::Granted,
        }
    }
}
