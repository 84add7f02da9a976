//! ドメイン層
//!
//! I/O を持たない純粋なロジックと、インメモリの状態（ルーム登録、クイズ監視、
//! ローマーの記録）を定義します。

pub mod classifier;
pub mod command;
pub mod delay;
pub mod error;
pub mod event;
pub mod port;
pub mod prize;
pub mod quiz_book;
pub mod registry;
pub mod roam_book;
pub mod solver;
pub mod value_object;

pub use classifier::{QuizEvent, classify};
pub use command::{Command, CommandKind, CommandLine, CommandParseError};
pub use delay::{DelayRange, DelayRangeError};
pub use error::{AuthError, CycleError, SendError, SolveError, ValueObjectError};
pub use event::{InboundEvent, JoinSource, OutboundCommand, RoomListingEntry, RoomMessage};
#[cfg(test)]
pub use port::MockTokenProvider;
pub use port::{ChatSender, TokenProvider};
pub use quiz_book::{CyclePhase, CycleState, QuizBook};
pub use registry::{RoomRegistry, RoomSession};
pub use roam_book::{RoamBook, RoamLogEntry};
pub use solver::{looks_solvable_directly, solve};
pub use value_object::{AuthToken, QuestionId, RoomId, UserId};
