pub mod actions;
pub mod events;

pub use actions::OutboundAction;
pub use events::{
    ChallengeRule, GameEndReason, GameHistory, MetaEvent, MetaEventType, PlayState, PlayerInfo,
    ServerMessage, Turn, TurnKind,
};
