//! Ordered, conflict-free option resolution.
//!
//! An [`OptionSet`] is seeded with a process's mandatory options and then
//! receives caller-supplied options. Keys stay unique at all times:
//!
//! - a new key is appended after everything already present,
//! - a key that is already present is replaced in place, so tuning a value
//!   never reorders the generated file,
//! - a [`OverridePolicy::Locked`] mandatory entry refuses replacement.
//!
//! A fresh set is built for every process start attempt; nothing here is
//! shared or long-lived.

use std::borrow::Cow;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::option_entry::{OptionEntry, OptionKey};
use crate::domain::errors::{DomainError, DomainResult};

/// Whether callers may replace a mandatory option by adding one with the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverridePolicy {
    /// Replaced in place when a caller adds the same key; the override is logged.
    #[default]
    Overridable,
    /// Structural option; adding the same key is rejected.
    Locked,
}

/// A baseline option declared by a process profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MandatoryOption {
    /// Option text, parsed when the set is seeded.
    pub raw: Cow<'static, str>,
    /// Whether callers may replace it.
    pub policy: OverridePolicy,
}

impl MandatoryOption {
    /// Mandatory option callers may tune.
    pub const fn overridable(raw: &'static str) -> Self {
        Self {
            raw: Cow::Borrowed(raw),
            policy: OverridePolicy::Overridable,
        }
    }

    /// Mandatory option callers can neither replace nor remove.
    pub const fn locked(raw: &'static str) -> Self {
        Self {
            raw: Cow::Borrowed(raw),
            policy: OverridePolicy::Locked,
        }
    }
}

impl From<&'static str> for MandatoryOption {
    fn from(raw: &'static str) -> Self {
        Self::overridable(raw)
    }
}

impl From<String> for MandatoryOption {
    fn from(raw: String) -> Self {
        Self {
            raw: Cow::Owned(raw),
            policy: OverridePolicy::Overridable,
        }
    }
}

/// What [`OptionSet::add`] did with the option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The key was new; the option went to the end.
    Appended,
    /// A previously added option with the same key was replaced in place.
    Replaced { previous: OptionEntry },
    /// A mandatory option was replaced in place.
    OverrodeMandatory { previous: OptionEntry },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Mandatory(OverridePolicy),
    Added,
}

#[derive(Debug, Clone)]
struct Slot {
    entry: OptionEntry,
    origin: Origin,
}

/// Resolved, ordered collection of options keyed by [`OptionKey`].
#[derive(Debug, Clone)]
pub struct OptionSet {
    slots: IndexMap<OptionKey, Slot>,
}

impl OptionSet {
    /// Seed a set with mandatory options, preserving declared order.
    ///
    /// Two mandatory options sharing a key, or an unparsable mandatory
    /// option, is a defect in the static configuration and fails with
    /// [`DomainError::Configuration`].
    pub fn new<I, M>(mandatory: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = M>,
        M: Into<MandatoryOption>,
    {
        let mut slots = IndexMap::new();
        for option in mandatory {
            let MandatoryOption { raw, policy } = option.into();
            let entry = OptionEntry::parse(&raw).map_err(|e| {
                DomainError::Configuration(format!("mandatory option is malformed: {e}"))
            })?;

            match slots.entry(entry.key().clone()) {
                Entry::Occupied(existing) => {
                    let existing: &Slot = existing.get();
                    return Err(DomainError::Configuration(format!(
                        "mandatory options '{}' and '{}' share the key '{}'",
                        existing.entry,
                        entry,
                        entry.key()
                    )));
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(Slot {
                        entry,
                        origin: Origin::Mandatory(policy),
                    });
                }
            }
        }

        debug!(count = slots.len(), "seeded option set with mandatory options");
        Ok(Self { slots })
    }

    /// Parse and merge one option.
    ///
    /// Fails with [`DomainError::InvalidOption`] on malformed text or when the
    /// key belongs to a locked mandatory option; the set is left unchanged.
    pub fn add(&mut self, raw: &str) -> DomainResult<AddOutcome> {
        let entry = OptionEntry::parse(raw)?;

        match self.slots.entry(entry.key().clone()) {
            Entry::Vacant(vacant) => {
                debug!(option = %entry, "appended option");
                vacant.insert(Slot {
                    entry,
                    origin: Origin::Added,
                });
                Ok(AddOutcome::Appended)
            }
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                match slot.origin {
                    Origin::Mandatory(OverridePolicy::Locked) => Err(DomainError::invalid_option(
                        raw,
                        format!("'{}' is a locked mandatory option", slot.entry),
                    )),
                    Origin::Mandatory(OverridePolicy::Overridable) => {
                        warn!(
                            key = %entry.key(),
                            default = %slot.entry,
                            value = %entry,
                            "mandatory option overridden"
                        );
                        let previous = std::mem::replace(&mut slot.entry, entry);
                        Ok(AddOutcome::OverrodeMandatory { previous })
                    }
                    Origin::Added => {
                        debug!(previous = %slot.entry, value = %entry, "replaced option");
                        let previous = std::mem::replace(&mut slot.entry, entry);
                        Ok(AddOutcome::Replaced { previous })
                    }
                }
            }
        }
    }

    /// Add options in order, stopping at the first one that fails.
    pub fn add_all<I, S>(&mut self, options: I) -> DomainResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for option in options {
            self.add(option.as_ref())?;
        }
        Ok(())
    }

    /// Remove the option with this key, if any. Later entries keep their relative order.
    ///
    /// Fails with [`DomainError::InvalidOption`] when the key belongs to a
    /// locked mandatory option; the set is left unchanged.
    pub fn remove(&mut self, key: &OptionKey) -> DomainResult<Option<OptionEntry>> {
        if let Some(slot) = self.slots.get(key) {
            if slot.origin == Origin::Mandatory(OverridePolicy::Locked) {
                return Err(DomainError::invalid_option(
                    slot.entry.raw(),
                    "locked mandatory option can't be removed",
                ));
            }
        }

        let Some(slot) = self.slots.shift_remove(key) else {
            return Ok(None);
        };
        if matches!(slot.origin, Origin::Mandatory(_)) {
            warn!(key = %key, option = %slot.entry, "mandatory option removed");
        }
        Ok(Some(slot.entry))
    }

    /// Rendered options in their stabilized order.
    pub fn get_all(&self) -> Vec<String> {
        self.entries().map(|e| e.raw().to_string()).collect()
    }

    /// Entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = &OptionEntry> + '_ {
        self.slots.values().map(|slot| &slot.entry)
    }

    /// Current entry for `key`.
    pub fn get(&self, key: &OptionKey) -> Option<&OptionEntry> {
        self.slots.get(key).map(|slot| &slot.entry)
    }

    pub fn contains_key(&self, key: &OptionKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Whether the key was seeded by the process profile (overridden or not).
    pub fn is_mandatory(&self, key: &OptionKey) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| matches!(slot.origin, Origin::Mandatory(_)))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
