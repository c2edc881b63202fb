pub mod domain;
pub mod ports;

pub use domain::{
    AuthMode, AuthRequest, CopilotQuery, CopilotResponse, Credential, EvidenceMismatch,
    InteractionState, SourceChunk, StatusClass, ValidationStatus,
};
pub use ports::{AuthenticationService, CopilotService, CredentialStorage, PortError, PortResult};
