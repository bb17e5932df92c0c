//! Abort and adjudication ("nudge") requests between the two players.

use serde::Serialize;

use crate::error::MetaError;
use crate::protocol::{MetaEvent, MetaEventType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaState {
    #[default]
    NoActiveRequest,
    RequestedAbort,
    RequestedAdjudication,
    ReceiverAbortCountdown,
    ReceiverAdjudicationCountdown,
}

impl MetaState {
    fn is_abort(self) -> bool {
        matches!(self, MetaState::RequestedAbort | MetaState::ReceiverAbortCountdown)
    }
}

/// The request currently open, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaRequest {
    pub event_id: String,
    pub creator: String,
    /// Local timestamp the countdown runs out at.
    pub deadline: f64,
}

/// A user-facing line describing what just happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaNotice(pub String);

impl MetaNotice {
    fn new(text: &str) -> Option<Self> {
        Some(Self(text.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetaMachine {
    me: Option<String>,
    state: MetaState,
    request: Option<MetaRequest>,
    /// Creator of the last request, kept after it closes to word the notice.
    last_creator: String,
}

impl MetaMachine {
    /// `me` is the local player's user id; `None` for observers.
    pub fn new(me: Option<String>) -> Self {
        Self { me, ..Default::default() }
    }

    pub fn state(&self) -> MetaState {
        self.state
    }

    pub fn request(&self) -> Option<&MetaRequest> {
        self.request.as_ref()
    }

    /// Remaining countdown at `now`, clamped at zero.
    pub fn remaining(&self, now: f64) -> Option<i64> {
        self.request.as_ref().map(|r| (r.deadline - now).max(0.0).ceil() as i64)
    }

    fn check_player(&self) -> Result<(), MetaError> {
        match self.me {
            Some(_) => Ok(()),
            None => Err(MetaError::NotReceiver),
        }
    }

    fn is_me(&self, user_id: &str) -> bool {
        self.me.as_deref() == Some(user_id)
    }

    /// Fold an inbound meta event. A new request while one is open is
    /// refused and the open one stands.
    pub fn handle(&mut self, evt: &MetaEvent, now: f64) -> Result<Option<MetaNotice>, MetaError> {
        let notice = match evt.event_type {
            MetaEventType::RequestAbort | MetaEventType::RequestAdjudication => {
                if self.me.is_none() {
                    // Observers are told the outcome, never asked.
                    log::debug!("meta {:?} seen as observer", evt.event_type);
                    return Ok(None);
                }
                if let Some(open) = &self.request {
                    return Err(MetaError::RequestPending(open.event_id.clone()));
                }
                let mine = self.is_me(&evt.player_id);
                self.state = match (evt.event_type, mine) {
                    (MetaEventType::RequestAbort, true) => MetaState::RequestedAbort,
                    (MetaEventType::RequestAbort, false) => MetaState::ReceiverAbortCountdown,
                    (_, true) => MetaState::RequestedAdjudication,
                    (_, false) => MetaState::ReceiverAdjudicationCountdown,
                };
                self.request = Some(MetaRequest {
                    event_id: evt.orig_event_id.clone(),
                    creator: evt.player_id.clone(),
                    deadline: now + evt.expiry as f64,
                });
                self.last_creator = evt.player_id.clone();
                None
            }
            MetaEventType::AbortDenied => {
                let text = if evt.player_id.is_empty() {
                    // A move was made, which cancels the request server-side.
                    "The cancel request expired."
                } else if evt.player_id == self.last_creator {
                    "The cancel request was withdrawn."
                } else if self.is_me(&evt.player_id) {
                    "You declined your opponent's cancel request."
                } else {
                    "Your opponent declined your request to cancel the game."
                };
                self.close();
                MetaNotice::new(text)
            }
            MetaEventType::AbortAccepted => {
                self.close();
                MetaNotice::new("The cancel request was accepted.")
            }
            MetaEventType::AdjudicationAccepted => {
                self.close();
                MetaNotice::new("The game was adjudicated.")
            }
            MetaEventType::AdjudicationDenied => {
                self.close();
                MetaNotice::new("The game will continue.")
            }
            MetaEventType::AddTime => {
                // The clock change itself arrives with the next refresher.
                if self.is_me(&evt.player_id) {
                    MetaNotice::new("You added 15 seconds to your opponent's clock.")
                } else {
                    MetaNotice::new("Your opponent added 15 seconds to your clock.")
                }
            }
            MetaEventType::TimerExpired => {
                self.close();
                None
            }
        };
        log::debug!("meta {:?} -> {:?}", evt.event_type, self.state);
        Ok(notice)
    }

    /// Accept the opponent's cancel request. Adjudication requests cannot be
    /// accepted, only answered with "keep playing".
    pub fn accept(&mut self, game_id: &str) -> Result<MetaEvent, MetaError> {
        self.check_player()?;
        match self.state {
            MetaState::ReceiverAbortCountdown => self.reply(game_id, MetaEventType::AbortAccepted),
            MetaState::NoActiveRequest => Err(MetaError::NoActiveRequest),
            _ => Err(MetaError::NotReceiver),
        }
    }

    /// Decline, or for the requester withdraw, the open request.
    pub fn decline(&mut self, game_id: &str) -> Result<MetaEvent, MetaError> {
        self.check_player()?;
        match self.state {
            MetaState::NoActiveRequest => Err(MetaError::NoActiveRequest),
            s if s.is_abort() => self.reply(game_id, MetaEventType::AbortDenied),
            _ => self.reply(game_id, MetaEventType::AdjudicationDenied),
        }
    }

    /// Report the open request's countdown as run out.
    pub fn expire(&mut self, game_id: &str) -> Result<MetaEvent, MetaError> {
        self.check_player()?;
        if self.state == MetaState::NoActiveRequest {
            return Err(MetaError::NoActiveRequest);
        }
        self.reply(game_id, MetaEventType::TimerExpired)
    }

    /// Expire the open request if its deadline has passed.
    pub fn poll(&mut self, game_id: &str, now: f64) -> Option<MetaEvent> {
        let due = self.request.as_ref().is_some_and(|r| now >= r.deadline);
        if due {
            self.expire(game_id).ok()
        } else {
            None
        }
    }

    /// Ask the server to open a request of our own.
    pub fn open(&self, game_id: &str, kind: MetaEventType) -> Result<MetaEvent, MetaError> {
        self.check_player()?;
        if let Some(open) = &self.request {
            return Err(MetaError::RequestPending(open.event_id.clone()));
        }
        Ok(MetaEvent {
            game_id: game_id.to_string(),
            event_type: kind,
            orig_event_id: String::new(),
            player_id: self.me.clone().unwrap_or_default(),
            expiry: 0,
        })
    }

    fn reply(&mut self, game_id: &str, kind: MetaEventType) -> Result<MetaEvent, MetaError> {
        let request = self.request.take().ok_or(MetaError::NoActiveRequest)?;
        self.state = MetaState::NoActiveRequest;
        log::debug!("meta reply {:?} to {}", kind, request.event_id);
        Ok(MetaEvent {
            game_id: game_id.to_string(),
            event_type: kind,
            orig_event_id: request.event_id,
            player_id: self.me.clone().unwrap_or_default(),
            expiry: 0,
        })
    }

    fn close(&mut self) {
        self.state = MetaState::NoActiveRequest;
        self.request = None;
    }
}
