use crate::error::{GroupingError, Result};
use std::collections::BTreeSet;
use std::fmt;

/// Dense index of a person inside its [`Group`]. Ids are handed out in
/// registration order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(usize);

impl PersonId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Person {
    id: PersonId,
    name: String,
    wishlist: Vec<PersonId>,
    denylist: BTreeSet<PersonId>,
}

impl Person {
    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Preferred partners in the order they were wished for.
    pub fn wishlist(&self) -> &[PersonId] {
        &self.wishlist
    }

    pub fn denylist(&self) -> &BTreeSet<PersonId> {
        &self.denylist
    }
}

/// Person registry plus the wish and deny graphs derived from the persons'
/// lists. The graphs are only ever touched by the methods that edit the
/// lists, so they cannot drift apart.
///
/// Registration and editing take `&mut self`; a generation borrows the group
/// immutably (or through an `Arc`) and therefore sees a frozen snapshot.
/// Concurrent registration is serialized by the borrow checker: threads that
/// register together share an `Arc<Mutex<Group>>`, and each id they get back
/// is unique.
#[derive(Debug, Clone, Default)]
pub struct Group {
    persons: Vec<Person>,
    wish_edges: BTreeSet<(PersonId, PersonId)>,
    wished_by: Vec<BTreeSet<PersonId>>,
    deny_pairs: BTreeSet<(PersonId, PersonId)>,
    denied: Vec<BTreeSet<PersonId>>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>) -> PersonId {
        let id = PersonId(self.persons.len());
        self.persons.push(Person {
            id,
            name: name.into(),
            wishlist: Vec::new(),
            denylist: BTreeSet::new(),
        });
        self.wished_by.push(BTreeSet::new());
        self.denied.push(BTreeSet::new());
        id
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(id.0)
    }

    pub fn person(&self, id: PersonId) -> Result<&Person> {
        self.get(id).ok_or(GroupingError::UnknownPerson(id))
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> + '_ {
        self.persons.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.persons.iter().map(|p| p.id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<PersonId> {
        self.persons.iter().find(|p| p.name == name).map(|p| p.id)
    }

    /// Display name, or the id itself when the id is foreign to this group.
    pub fn name_of(&self, id: PersonId) -> String {
        self.get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn check_pair(&self, a: PersonId, b: PersonId) -> Result<()> {
        self.person(a)?;
        self.person(b)?;
        if a == b {
            return Err(GroupingError::invalid_argument(format!(
                "{} cannot be paired with themselves",
                self.name_of(a)
            )));
        }
        Ok(())
    }

    /// Adds `to` to the wishlist of `from`. Adding an existing wish is a no-op.
    pub fn add_wish(&mut self, from: PersonId, to: PersonId) -> Result<()> {
        self.check_pair(from, to)?;
        if self.wish_edges.insert((from, to)) {
            self.persons[from.0].wishlist.push(to);
            self.wished_by[to.0].insert(from);
        }
        Ok(())
    }

    pub fn remove_wish(&mut self, from: PersonId, to: PersonId) -> Result<()> {
        self.check_pair(from, to)?;
        if self.wish_edges.remove(&(from, to)) {
            self.persons[from.0].wishlist.retain(|id| *id != to);
            self.wished_by[to.0].remove(&from);
        }
        Ok(())
    }

    /// Records that `who` refuses to share a subgroup with `other`. The
    /// resulting deny pair is unordered.
    pub fn add_deny(&mut self, who: PersonId, other: PersonId) -> Result<()> {
        self.check_pair(who, other)?;
        self.persons[who.0].denylist.insert(other);
        self.deny_pairs.insert(ordered(who, other));
        self.denied[who.0].insert(other);
        self.denied[other.0].insert(who);
        Ok(())
    }

    /// Takes `other` off the denylist of `who`. The pair stays denied while
    /// `other` still lists `who`.
    pub fn remove_deny(&mut self, who: PersonId, other: PersonId) -> Result<()> {
        self.check_pair(who, other)?;
        self.persons[who.0].denylist.remove(&other);
        if !self.persons[other.0].denylist.contains(&who) {
            self.deny_pairs.remove(&ordered(who, other));
            self.denied[who.0].remove(&other);
            self.denied[other.0].remove(&who);
        }
        Ok(())
    }

    /// Wishlist of `id`; empty for unknown ids.
    pub fn wishes(&self, id: PersonId) -> &[PersonId] {
        self.get(id).map(|p| p.wishlist.as_slice()).unwrap_or(&[])
    }

    pub fn wished_by(&self, id: PersonId) -> impl Iterator<Item = PersonId> + '_ {
        self.wished_by.get(id.0).into_iter().flatten().copied()
    }

    pub fn wishes_for(&self, from: PersonId, to: PersonId) -> bool {
        self.wish_edges.contains(&(from, to))
    }

    /// Number of wish edges between `a` and `b`, counting both directions.
    pub fn wish_links(&self, a: PersonId, b: PersonId) -> usize {
        usize::from(self.wishes_for(a, b)) + usize::from(self.wishes_for(b, a))
    }

    /// True if either person denies the other.
    pub fn denies(&self, a: PersonId, b: PersonId) -> bool {
        self.denied.get(a.0).is_some_and(|set| set.contains(&b))
    }

    pub fn wish_edges(&self) -> &BTreeSet<(PersonId, PersonId)> {
        &self.wish_edges
    }

    pub fn deny_pairs(&self) -> &BTreeSet<(PersonId, PersonId)> {
        &self.deny_pairs
    }
}

fn ordered(a: PersonId, b: PersonId) -> (PersonId, PersonId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
