//! Device sessions, vendor drivers and change orchestration for layer-2
//! switches.
//!
//! This crate owns the domain model and business logic of switchyard:
//!
//! - **[`Controller`]**: Facade for every operation a front end invokes:
//!   listing and searching switches, viewing a device, running single
//!   changes, bulk edits and commands, and reading the activity log. Access
//!   checks run before any device is contacted.
//!
//! - **[`DeviceSession`]**: One user's working view of one device: the
//!   vendor [`Driver`], the cached [`SwitchState`] and the policy deciding
//!   which interfaces and VLANs may be changed. [`SessionManager`] restores
//!   sessions from a [`SessionStore`] or reads the device afresh.
//!
//! - **Drivers** ([`driver`]): A closed set of connector variants (SNMP,
//!   SNMP with SSH, commands only, vendor REST, in-memory dummy) behind the
//!   [`DeviceDriver`] capability interface.
//!
//! - **[`BulkEditor`]**: Applies one change set across many interfaces in
//!   the fixed order admin status, PoE, VLAN, description.
//!
//! - **Audit** ([`activity`], [`counters`]): Every outcome is written to an
//!   [`ActivityLog`]; usage counters track views, changes and errors.

pub mod access;
pub mod activity;
pub mod bulk;
pub mod catalog;
pub mod command;
pub mod config;
pub mod controller;
pub mod counters;
pub mod driver;
pub mod error;
pub mod inventory;
pub mod model;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use access::{GroupPermission, PermissionMap, SwitchSummary};
pub use activity::{ActivityLog, ActivityRecorder, LogFilter, MemoryActivityLog};
pub use bulk::{
    AdminAction, BulkEditRequest, BulkEditSummary, BulkEditor, ChangeSet, DescriptionChange,
    PoeAction,
};
pub use catalog::{CommandCatalog, CommandDefinition, CommandKind, CommandTemplate};
pub use command::requests::*;
pub use command::{Command, CommandOutput, CommandResult};
pub use config::{
    ApiProfile, CoreConfig, CredentialProfiles, DescriptionMode, EditPolicy, SnmpProfile,
    SnmpSettings, SshProfile, TlsVerification,
};
pub use controller::{
    AdminStats, Controller, ControllerParts, RequestContext, SearchHit, SwitchView, View,
};
pub use counters::{Counter, CounterValue, Counters};
pub use driver::{Capabilities, DeviceDriver, Driver, DriverFactory, TransportFactory};
pub use error::{CoreError, ErrorReport};
pub use inventory::{Inventory, StaticInventory};
pub use session::{
    DeviceSession, MemorySessionStore, ReadPhase, SessionKey, SessionManager, SessionPolicy,
    SessionStore, SwitchState,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ConnectorKind, Device, DeviceStatus, EthernetEntry, HardwareEntry, Interface, InterfaceKind,
    LldpNeighbor, LogAction, LogEntry, LogType, MacAddress, PoeStatus, PortStatus, SwitchGroup,
    SystemFacts, User, Vlan,
};
