//! Session state, passed in explicitly wherever author identity is needed.
//!
//! The identity provider (sign-up, login, logout) lives outside this crate;
//! its adapter pushes the resulting profile into `Session` via [`Session::set_user`]
//! and interested parties subscribe with [`Session::on_change`]. Nothing here
//! is a process-wide global.

use std::mem;
use std::sync::{Mutex, MutexGuard, RwLock};

use tracing::{debug, info};

use crate::models::UserProfile;

type Watcher = Box<dyn Fn(Option<&UserProfile>)>;

#[derive(Default)]
pub struct Session {
    user: RwLock<Option<UserProfile>>,
    watchers: Mutex<Vec<Watcher>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for tests and shells that start signed in.
    pub fn signed_in(profile: UserProfile) -> Self {
        let session = Self::new();
        session.set_user(Some(profile));
        session
    }

    pub fn current(&self) -> Option<UserProfile> {
        match self.user.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn email(&self) -> Option<String> {
        self.current().map(|profile| profile.email)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }

    /// Called by the auth adapter when login or logout completes. Watchers
    /// run after the new state is visible.
    pub fn set_user(&self, user: Option<UserProfile>) {
        match &user {
            Some(profile) => info!(email = %profile.email, "session signed in"),
            None => info!("session signed out"),
        }
        {
            let mut guard = match self.user.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = user.clone();
        }
        self.notify(user.as_ref());
    }

    /// Profile edits (display name, photo) pushed through the identity
    /// provider. No-op when nobody is signed in.
    pub fn update_profile(&self, display_name: &str, photo_url: &str) {
        let updated = {
            let mut guard = match self.user.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match guard.as_mut() {
                Some(profile) => {
                    profile.display_name = display_name.to_string();
                    profile.photo_url = photo_url.to_string();
                    Some(profile.clone())
                }
                None => None,
            }
        };
        match updated {
            Some(profile) => self.notify(Some(&profile)),
            None => debug!("profile update ignored, no active session"),
        }
    }

    /// Registers a callback fired on every session change. A watcher
    /// registered from inside another watcher first fires on the next
    /// change.
    pub fn on_change(&self, watcher: impl Fn(Option<&UserProfile>) + 'static) {
        self.watchers_guard().push(Box::new(watcher));
    }

    fn notify(&self, user: Option<&UserProfile>) {
        // Watchers may re-enter the session, so the lock is not held while
        // they run.
        let registered = mem::take(&mut *self.watchers_guard());
        for watcher in &registered {
            watcher(user);
        }
        let mut guard = self.watchers_guard();
        let late = mem::take(&mut *guard);
        *guard = registered;
        guard.extend(late);
    }

    fn watchers_guard(&self) -> MutexGuard<'_, Vec<Watcher>> {
        match self.watchers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
