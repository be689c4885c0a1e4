//! KTF - kernel test framework core
//!
//! Test modules register named test functions under named test cases; test
//! bodies report assertion outcomes back to a listener as batched result
//! attributes.
//!
//! - [`Registry`]: test cases, hooks, handles, unload safety
//! - [`report`]: pass counting and failure records
//! - [`attr`]: the attribute wire format and its listener-side decoder

pub mod attr;
pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod utils;

pub use attr::{AttrBuffer, AttrType, AttributeSink, ReportRecord};
pub use config::KtfConfig;
pub use error::{KtfError, KtfResult};
pub use registry::{
    CaseSummary, ExitPolicy, Handle, HandleId, Hook, HookId, Registry, TestDescriptor, TestFn,
};
pub use report::{Reporter, TestRun};
