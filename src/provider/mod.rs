pub use self::{
    database::DatabasePool,
    event::Event,
    rpc::{NodeRpc, ParticlRpc},
    synchronization::{SyncReport, Synchronization},
};

mod database;
mod event;
mod rpc;
mod synchronization;
