//! # gallery-deploy
//!
//! Reconciles the local draft with the published remote store.
//!
//! [`plan::plan`] computes the three-way split (update / insert / delete) as
//! a pure function; [`Deployer::deploy`] applies it sequentially and tracks
//! the deploy state. [`FileRemote`] and [`RestRemote`] are the two live
//! remote stores.

pub mod diff;
pub mod error;
pub mod file_remote;
pub mod pipeline;
pub mod plan;
pub mod reconciler;
pub mod rest;

pub use diff::{diff_items, ChangeKind, ItemDiff};
pub use error::DeployError;
pub use file_remote::FileRemote;
pub use plan::{plan, DeployPlan, PlanStep};
pub use reconciler::{apply, ApplyReport, DeployReport, DeployState, Deployer};
pub use rest::RestRemote;
