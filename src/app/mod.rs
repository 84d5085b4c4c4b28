// Collaborator boundaries of the mapping engine
pub mod ports;
