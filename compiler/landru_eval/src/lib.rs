//! Landru Eval - the runtime for compiled Landru programs.
//!
//! # Architecture
//!
//! - `Engine`: owns the program, every machine instance and the scheduler
//!   queues. The host drives it one tick at a time.
//! - `MachineInstance`: a launched machine with its stack of local
//!   contexts, instance variables and shared references.
//! - `LibraryRegistry`: native functions, module values and event
//!   conditions, including the standard `io`, `math` and `time` libraries.
//! - `Clock` and `PrintHandler`: the engine's only contact with the
//!   outside world besides host-registered libraries.
//!
//! Everything is single-threaded. Concurrency between machines is
//! cooperative: an instance runs until it queues a `goto` or `launch`,
//! or runs out of instructions.

mod clock;
mod config;
mod engine;
pub mod errors;
mod instance;
mod print_handler;
mod registry;
mod scope;
mod shared;
mod stdlib;
mod value;

pub use clock::{Clock, ManualClock};
pub use config::{EngineConfig, DEFAULT_MAX_CALL_DEPTH};
pub use engine::{Engine, EngineBuilder, RunSummary, TickReport};
pub use errors::{
    ArityOrTypeError, InstanceFault, NameError, NameKind, RuntimeError, RuntimeResult,
};
pub use instance::{InstanceId, InstanceState, MachineInstance};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use registry::{module_of, ConditionFn, LibraryRegistry, NativeFn};
pub use scope::{ContextKind, LocalContext, PendingCallback};
pub use stdlib::{install_io, install_math, install_time};
pub use value::{Handle, Value};
