//! Game creation: board description and extension activation.
//!
//! The physical board catalog (which hexes, planets and slots exist) is out
//! of the engine's scope, so a setup describes it opaquely: a list of zones
//! and the tokens that start in them. Extensions are named; the catalog maps
//! each name to the hook registrations it installs.

use std::collections::BTreeMap;
use std::sync::Arc;

use umbra_core::{
    GameState, HookRegistry, PlayerId, Token, TokenKind, ZoneKind,
};

use crate::error::{Result, RuntimeError};

/// Typed handle to a zone declared in a [`GameSetup`], usable before real
/// zone ids exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneRef(usize);

struct ZoneSpec {
    kind: ZoneKind,
    capacity: Option<u32>,
}

struct TokenSpec {
    kind: TokenKind,
    owner: Option<PlayerId>,
    zone: ZoneRef,
    home: Option<ZoneRef>,
}

/// Declarative description of a new game: players in turn order, activated
/// extensions, and the opaque board.
pub struct GameSetup {
    players: Vec<PlayerId>,
    extensions: Vec<String>,
    zones: Vec<ZoneSpec>,
    tokens: Vec<TokenSpec>,
}

impl GameSetup {
    /// Starts a setup for the given players, in turn order.
    pub fn new(players: Vec<PlayerId>) -> Self {
        Self {
            players,
            extensions: Vec::new(),
            zones: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Activates a named extension for this game.
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.push(name.into());
        self
    }

    /// Declares a zone and returns a handle to reference it from tokens.
    pub fn add_zone(&mut self, kind: ZoneKind, capacity: Option<u32>) -> ZoneRef {
        self.zones.push(ZoneSpec { kind, capacity });
        ZoneRef(self.zones.len() - 1)
    }

    /// Declares a token starting in `zone`.
    pub fn add_token(&mut self, kind: TokenKind, owner: Option<PlayerId>, zone: ZoneRef) {
        self.tokens.push(TokenSpec {
            kind,
            owner,
            zone,
            home: None,
        });
    }

    /// Declares a token with a home zone cleanup returns it to.
    pub fn add_token_with_home(
        &mut self,
        kind: TokenKind,
        owner: Option<PlayerId>,
        zone: ZoneRef,
        home: ZoneRef,
    ) {
        self.tokens.push(TokenSpec {
            kind,
            owner,
            zone,
            home: Some(home),
        });
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Materializes the installation-phase state.
    pub(crate) fn build(&self) -> Result<GameState> {
        if self.players.is_empty() {
            return Err(RuntimeError::Setup("a game needs at least one player".into()));
        }
        let mut state = GameState::new(self.players.clone());
        state.extensions = self.extensions.clone();

        let zone_ids: Vec<_> = self
            .zones
            .iter()
            .map(|spec| state.add_zone(spec.kind, spec.capacity))
            .collect();

        for spec in &self.tokens {
            let mut token = Token::new(spec.kind, spec.owner);
            if let Some(ZoneRef(home)) = spec.home {
                let home = zone_ids
                    .get(home)
                    .ok_or_else(|| RuntimeError::Setup(format!("no zone ref {home}")))?;
                token = token.with_home(*home);
            }
            let ZoneRef(zone) = spec.zone;
            let zone = zone_ids
                .get(zone)
                .ok_or_else(|| RuntimeError::Setup(format!("no zone ref {zone}")))?;
            state
                .spawn_token(token, *zone)
                .map_err(|fault| RuntimeError::Setup(fault.to_string()))?;
        }
        Ok(state)
    }
}

/// Installs one extension's hooks into a registry.
pub type ExtensionInstaller = Arc<dyn Fn(&mut HookRegistry) + Send + Sync>;

/// The extensions this process knows how to activate, by name.
///
/// Rules content lives behind the installers; the engine only ever sees the
/// hooks they register.
#[derive(Clone, Default)]
pub struct ExtensionCatalog {
    installers: BTreeMap<String, ExtensionInstaller>,
}

impl ExtensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, installer: ExtensionInstaller) {
        self.installers.insert(name.into(), installer);
    }

    /// Builds the hook registry for a game's activated extensions.
    pub fn registry_for(&self, names: &[String]) -> Result<HookRegistry> {
        let mut registry = HookRegistry::new();
        for name in names {
            let installer = self
                .installers
                .get(name)
                .ok_or_else(|| RuntimeError::UnknownExtension(name.clone()))?;
            installer(&mut registry);
        }
        Ok(registry)
    }
}
