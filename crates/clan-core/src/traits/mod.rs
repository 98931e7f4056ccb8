//! Port traits - the interfaces the core exchanges with external systems

mod ports;

pub use ports::{
    ClanListEntry, HiscoresApi, PlayerDetail, PortResult, RosterMirror, RosterTab, SiteApi,
};
