// src/credentials.rs
//! Where the (netid, password) pair comes from. The core only ever sees a
//! [`Credential`]; it never stores one.

use std::{env, fmt};

use dialoguer::{Input, Password};
use keyring::Entry;

use crate::config::consts::{KEYRING_SERVICE, NETID_ENV, PASSWORD_ENV};
use crate::error::{CatsError, Result};

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub netid: String,
    pub password: String,
}

impl Credential {
    pub fn new(netid: impl Into<String>, password: impl Into<String>) -> Self {
        Self { netid: netid.into(), password: password.into() }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("netid", &self.netid)
            .field("password", &"***")
            .finish()
    }
}

pub trait CredentialSource {
    fn get_credentials(&self) -> Result<Credential>;
}

/// `FAST_CATS_NETID` + `FAST_CATS_PASSWORD`.
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get_credentials(&self) -> Result<Credential> {
        let netid = env_var(NETID_ENV)?;
        let password = env_var(PASSWORD_ENV)?;
        Ok(Credential { netid, password })
    }
}

fn env_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(CatsError::Credentials(format!("{name} is not set"))),
    }
}

/// Password stored in the OS keyring under service `fast_cats`, entry = netid.
pub struct KeyringCredentials {
    pub netid: String,
}

impl CredentialSource for KeyringCredentials {
    fn get_credentials(&self) -> Result<Credential> {
        let entry = Entry::new(KEYRING_SERVICE, &self.netid)
            .map_err(|e| CatsError::Credentials(format!("keyring unavailable: {e}")))?;
        let password = entry
            .get_password()
            .map_err(|e| CatsError::Credentials(format!("no keyring entry for {}: {e}", self.netid)))?;
        Ok(Credential { netid: self.netid.clone(), password })
    }
}

/// Ask on the terminal. Skips the netid prompt when one is already known.
pub struct PromptCredentials {
    pub netid: Option<String>,
}

impl CredentialSource for PromptCredentials {
    fn get_credentials(&self) -> Result<Credential> {
        let netid = match &self.netid {
            Some(n) => n.clone(),
            None => Input::<String>::new()
                .with_prompt("netid")
                .interact_text()
                .map_err(|e| CatsError::Credentials(e.to_string()))?,
        };
        let password = Password::new()
            .with_prompt(format!("password for {netid}"))
            .interact()
            .map_err(|e| CatsError::Credentials(e.to_string()))?;
        Ok(Credential { netid, password })
    }
}

/// Env first, then the keyring for the env netid, then the terminal.
pub struct DefaultCredentials;

impl CredentialSource for DefaultCredentials {
    fn get_credentials(&self) -> Result<Credential> {
        if let Ok(c) = EnvCredentials.get_credentials() {
            return Ok(c);
        }
        let netid = env_var(NETID_ENV).ok();
        if let Some(n) = &netid {
            match (KeyringCredentials { netid: n.clone() }).get_credentials() {
                Ok(c) => return Ok(c),
                Err(e) => logd!("{e}; falling back to prompt"),
            }
        }
        PromptCredentials { netid }.get_credentials()
    }
}
