//! Scripted collaborators for driving the mailer without a network or a terminal

#![allow(dead_code)]

use lettre::Message;
use mailmerge_rs::delivery::{Channel, Confirmer, Previewer, Session};
use mailmerge_rs::{MergeError, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(String),
    Login(String),
    Send(Vec<u8>),
    Close,
}

/// Channel that records every call and can be told to fail
#[derive(Default)]
pub struct FakeChannel {
    pub events: Rc<RefCell<Vec<Event>>>,
    pub fail_login: bool,
    /// Fail the send with this zero-based index
    pub fail_send_at: Option<usize>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Rc<RefCell<Vec<Event>>> {
        Rc::clone(&self.events)
    }
}

pub struct FakeSession {
    events: Rc<RefCell<Vec<Event>>>,
    fail_login: bool,
    fail_send_at: Option<usize>,
    sends: usize,
}

impl Channel for FakeChannel {
    type Session = FakeSession;

    fn open(&mut self, server: &str) -> Result<FakeSession> {
        self.events.borrow_mut().push(Event::Open(server.to_string()));
        Ok(FakeSession {
            events: Rc::clone(&self.events),
            fail_login: self.fail_login,
            fail_send_at: self.fail_send_at,
            sends: 0,
        })
    }
}

impl Session for FakeSession {
    fn login(&mut self, user: &str, _pwd: &str) -> Result<()> {
        self.events.borrow_mut().push(Event::Login(user.to_string()));
        if self.fail_login {
            return Err(MergeError::Transport("535 authentication failed".to_string()));
        }
        Ok(())
    }

    fn send(&mut self, message: &Message) -> Result<()> {
        let index = self.sends;
        self.sends += 1;
        if self.fail_send_at == Some(index) {
            return Err(MergeError::Transport("451 try again later".to_string()));
        }
        self.events.borrow_mut().push(Event::Send(message.formatted()));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.events.borrow_mut().push(Event::Close);
        Ok(())
    }
}

/// Answers confirmations from a script; runs out as "no"
pub struct ScriptedConfirmer {
    answers: VecDeque<String>,
    pub prompts: Vec<(String, String)>,
}

impl ScriptedConfirmer {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            prompts: Vec::new(),
        }
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&mut self, details: &str, prompt: &str) -> Result<bool> {
        self.prompts.push((details.to_string(), prompt.to_string()));
        let answer = self.answers.pop_front().unwrap_or_default();
        Ok(answer == mailmerge_rs::delivery::CONFIRMATION_TOKEN)
    }
}

/// Remembers every preview instead of opening a viewer
#[derive(Default)]
pub struct RecordingPreviewer {
    pub previews: RefCell<Vec<(String, String, String)>>,
}

impl Previewer for RecordingPreviewer {
    fn preview(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        self.previews
            .borrow_mut()
            .push((to.to_string(), subject.to_string(), html.to_string()));
        Ok(())
    }
}

pub fn sent_messages(events: &[Event]) -> Vec<Vec<u8>> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Send(raw) => Some(raw.clone()),
            _ => None,
        })
        .collect()
}

pub fn count(events: &[Event], wanted: fn(&Event) -> bool) -> usize {
    events.iter().filter(|event| wanted(event)).count()
}
