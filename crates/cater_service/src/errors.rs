//! Attribute-keyed error collection.
//!
//! [`Errors`] is an ordered multi-map from [`Attribute`] to failure messages.
//! Attributes keep the order in which they were first seen, and messages keep
//! the order in which they were added. Nothing is de-duplicated: adding the
//! same message twice records it twice.
//!
//! # Example
//!
//! ```
//! use cater_service::errors::Errors;
//!
//! let mut errors = Errors::new();
//! errors.add("email", "is invalid");
//! errors.add("email", "is taken");
//! errors.add_base("Something went wrong");
//!
//! assert_eq!(errors["email"], ["is invalid", "is taken"]);
//! assert_eq!(errors["base"], ["Something went wrong"]);
//! assert!(errors["name"].is_empty());
//! ```

use core::borrow::Borrow;
use core::fmt;
use core::ops::Index;
use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Attribute
// ─────────────────────────────────────────────────────────────────────────────

/// Key under which failure messages are grouped.
///
/// Usually the name of the field a message refers to. Messages that are not
/// tied to a particular field go under [`Attribute::BASE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attribute(Cow<'static, str>);

impl Attribute {
    /// Name of the reserved attribute for messages about the whole operation.
    pub const BASE: &'static str = "base";

    /// Creates an attribute from a static name without allocating.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the reserved `base` attribute.
    #[must_use]
    pub const fn base() -> Self {
        Self::from_static(Self::BASE)
    }

    /// Returns the attribute name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the reserved `base` attribute.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.as_str() == Self::BASE
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Attribute {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Attribute {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Attribute {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&Attribute> for Attribute {
    fn from(attribute: &Attribute) -> Self {
        attribute.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// One or more messages destined for a single attribute.
///
/// Structured failure input may give either a single message or a list of
/// messages per attribute; both normalize to this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Messages(Vec<String>);

impl Messages {
    /// Returns the messages as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consumes the list and returns the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Messages {
    fn from(message: &str) -> Self {
        Self(vec![message.to_owned()])
    }
}

impl From<String> for Messages {
    fn from(message: String) -> Self {
        Self(vec![message])
    }
}

impl From<Vec<String>> for Messages {
    fn from(messages: Vec<String>) -> Self {
        Self(messages)
    }
}

impl From<Vec<&str>> for Messages {
    fn from(messages: Vec<&str>) -> Self {
        Self(messages.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for Messages {
    fn from(messages: &[&str]) -> Self {
        Self(messages.iter().map(|m| (*m).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Messages {
    fn from(messages: [&str; N]) -> Self {
        Self(messages.iter().map(|m| (*m).to_owned()).collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered, attribute-keyed collection of failure messages.
///
/// Serializes as a JSON-style object `{attribute: [messages]}` with the
/// attribute order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Errors {
    messages: IndexMap<Attribute, Vec<String>>,
}

impl Errors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` to the messages recorded for `attribute`.
    pub fn add(&mut self, attribute: impl Into<Attribute>, message: impl Into<String>) -> &mut Self {
        self.messages
            .entry(attribute.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Appends `message` under the reserved `base` attribute.
    pub fn add_base(&mut self, message: impl Into<String>) -> &mut Self {
        self.add(Attribute::base(), message)
    }

    /// Adds every message of every entry, preserving the order of both.
    ///
    /// ```
    /// use cater_service::errors::Errors;
    ///
    /// let mut errors = Errors::new();
    /// errors.extend([("name", vec!["is required"]), ("email", vec!["invalid", "taken"])]);
    ///
    /// assert_eq!(errors["email"], ["invalid", "taken"]);
    /// ```
    pub fn extend<I, A, M>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (A, M)>,
        A: Into<Attribute>,
        M: Into<Messages>,
    {
        for (attribute, messages) in entries {
            let attribute = attribute.into();
            for message in messages.into().into_vec() {
                self.add(attribute.clone(), message);
            }
        }
        self
    }

    /// Appends every message of `other` to this collection.
    ///
    /// Existing entries are kept; `other`'s messages land after them, in
    /// `other`'s order.
    pub fn merge(&mut self, other: &Errors) -> &mut Self {
        for (attribute, message) in other.iter() {
            self.add(attribute, message);
        }
        self
    }

    /// Returns the messages recorded for `attribute`, or an empty slice.
    #[must_use]
    pub fn get(&self, attribute: &str) -> &[String] {
        self.messages.get(attribute).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if at least one message is recorded for `attribute`.
    #[must_use]
    pub fn contains(&self, attribute: &str) -> bool {
        !self.get(attribute).is_empty()
    }

    /// Returns `true` if no attribute has any message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.values().all(Vec::is_empty)
    }

    /// Returns the total number of messages across all attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    /// Iterates over attributes in first-insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.messages.keys()
    }

    /// Iterates over `(attribute, messages)` groups.
    pub fn messages(&self) -> impl Iterator<Item = (&Attribute, &[String])> {
        self.messages
            .iter()
            .map(|(attribute, messages)| (attribute, messages.as_slice()))
    }

    /// Iterates over every `(attribute, message)` pair in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Attribute, &str)> {
        self.messages.iter().flat_map(|(attribute, messages)| {
            messages
                .iter()
                .map(move |message| (attribute, message.as_str()))
        })
    }
}

impl Index<&str> for Errors {
    type Output = [String];

    fn index(&self, attribute: &str) -> &[String] {
        self.get(attribute)
    }
}

impl<A, M> FromIterator<(A, M)> for Errors
where
    A: Into<Attribute>,
    M: Into<Messages>,
{
    fn from_iter<I: IntoIterator<Item = (A, M)>>(entries: I) -> Self {
        let mut errors = Errors::new();
        errors.extend(entries);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_creates_key_and_appends() {
        let mut errors = Errors::new();
        assert!(errors.is_empty());

        errors.add("name", "is required");
        errors.add("name", "is too short");

        assert!(!errors.is_empty());
        assert_eq!(errors["name"], ["is required", "is too short"]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn add_keeps_duplicates() {
        let mut errors = Errors::new();
        errors.add_base("boom").add_base("boom");

        assert_eq!(errors["base"], ["boom", "boom"]);
    }

    #[test]
    fn missing_attribute_is_empty_slice() {
        let errors = Errors::new();
        assert!(errors.get("nope").is_empty());
        assert!(!errors.contains("nope"));
    }

    #[test]
    fn extend_accepts_single_and_many_messages() {
        let mut errors = Errors::new();
        errors.extend([("name", Messages::from("is required"))]);
        errors.extend([("email", ["invalid", "taken"])]);

        assert_eq!(errors["name"], ["is required"]);
        assert_eq!(errors["email"], ["invalid", "taken"]);
        let attributes: Vec<_> = errors.attributes().map(Attribute::as_str).collect();
        assert_eq!(attributes, ["name", "email"]);
    }

    #[test]
    fn merge_appends_after_existing_entries() {
        let mut errors = Errors::new();
        errors.add_base("first");

        let other: Errors = [("base", "boom"), ("name", "is required")]
            .into_iter()
            .collect();
        errors.merge(&other);

        assert_eq!(errors["base"], ["first", "boom"]);
        assert_eq!(errors["name"], ["is required"]);
        // the source collection is untouched
        assert_eq!(other.len(), 2);
    }

    #[test]
    fn iter_yields_pairs_in_order() {
        let mut errors = Errors::new();
        errors.add("a", "1").add("b", "2").add("a", "3");

        let pairs: Vec<_> = errors.iter().map(|(a, m)| (a.as_str(), m)).collect();
        assert_eq!(pairs, [("a", "1"), ("a", "3"), ("b", "2")]);
    }

    #[test]
    fn attribute_base_helpers() {
        assert!(Attribute::base().is_base());
        assert!(!Attribute::from("name").is_base());
        assert_eq!(Attribute::from(String::from("email")).to_string(), "email");
    }

    #[test]
    fn deserialized_empty_lists_count_as_empty() {
        let mut messages = IndexMap::new();
        messages.insert(Attribute::from("name"), Vec::new());
        let errors = Errors { messages };

        assert!(errors.is_empty());
        assert_eq!(errors.len(), 0);
    }
}
