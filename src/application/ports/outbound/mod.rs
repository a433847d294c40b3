//! Outbound ports - Interfaces that the application requires from external systems

mod random_port;
mod repository_port;
mod transport_port;

pub use random_port::DiceRoller;
pub use repository_port::{CampaignRepositoryPort, PersistenceError};
#[cfg(test)]
pub use repository_port::MockCampaignRepositoryPort;
#[cfg(test)]
pub use transport_port::MockMessageTransportPort;
pub use transport_port::{MessageTransportPort, TransportError};
