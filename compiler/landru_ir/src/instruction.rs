//! Instructions carried by exemplars.

use smallvec::SmallVec;

use super::{Constant, ExemplarId, Name};

/// Where an argument or assigned value comes from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ValueSource {
    /// A literal from the tape. Atoms are late-bound variable references.
    Constant(Constant),
    /// An inline compiled sub-expression (`List` or `Monad` exemplar).
    Nested(ExemplarId),
}

/// Call arguments; most calls take at most two.
pub type CallArgs = SmallVec<[ValueSource; 2]>;

/// One step of a machine, state, handler, or function body.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// Spawn a machine by name. Serviced on the next tick.
    Launch(Name),
    /// Transition to a state by name. Serviced on the next tick.
    Goto(Name),
    /// Assign a variable, declaring a local if the name is unbound.
    SetVar(Name, ValueSource),
    /// Declare a per-machine-type shared variable with its default.
    Shared(Name, ValueSource),
    /// Call a script function or library function. Resolved at run time.
    Call(Name, CallArgs),
}

impl Instruction {
    /// `goto` and `launch` end the run of an instruction list.
    #[inline]
    pub fn is_transfer(&self) -> bool {
        matches!(self, Instruction::Launch(_) | Instruction::Goto(_))
    }

    /// Keyword used to write this instruction, for diagnostics and dumps.
    pub fn keyword(&self) -> &'static str {
        match self {
            Instruction::Launch(_) => "launch",
            Instruction::Goto(_) => "goto",
            Instruction::SetVar(..) => "set",
            Instruction::Shared(..) => "shared",
            Instruction::Call(..) => "call",
        }
    }
}
