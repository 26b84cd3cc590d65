//! Circles: ordered groups of participants rotated into gift links.

use tracing::debug;

use crate::domain::entities::{GiftLink, Participant};
use crate::domain::interleave::{FairInterleaver, NonLargestPick};

/// Pair every member with its successor, the last one with the first.
///
/// ```text
/// [a, b, c, d] -> [ab, bc, cd, da]
/// ```
///
/// A single member is paired with itself; callers check the size first.
pub fn rotate<T>(members: &[T]) -> Vec<(&T, &T)> {
    let n = members.len();
    (0..n)
        .map(|i| (&members[i], &members[(i + 1) % n]))
        .collect()
}

/// Ordered membership shared by both circle kinds.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Circle {
    members: Vec<Participant>,
}

impl Circle {
    pub fn new(members: Vec<Participant>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append participants at the end of the circle.
    pub fn extend(&mut self, participants: impl IntoIterator<Item = Participant>) {
        self.members.extend(participants);
    }

    /// Gift links for the current membership.
    pub fn rotate(&self) -> Vec<GiftLink<'_>> {
        rotate(&self.members)
            .into_iter()
            .map(|(giver, receiver)| GiftLink { giver, receiver })
            .collect()
    }

    /// Remove the only member, if the circle has exactly one.
    pub fn take_lone(&mut self) -> Option<Participant> {
        if self.members.len() == 1 {
            self.members.pop()
        } else {
            None
        }
    }

    /// A one-member circle is invalid: its member leaves as a reject.
    fn reject_lone(&mut self) -> Vec<Participant> {
        let mut rejects: Vec<Participant> = self.take_lone().into_iter().collect();
        for p in &mut rejects {
            p.mark_reject();
        }
        rejects
    }
}

/// Circle of participants from a single country.
#[derive(Debug, PartialEq, Eq)]
pub struct DomesticCircle {
    country: String,
    circle: Circle,
}

impl DomesticCircle {
    /// Move every participant of `country` out of `pool`, keeping input order.
    pub fn from_pool(country: impl Into<String>, pool: &mut Vec<Participant>) -> Self {
        let country = country.into();
        let (members, rest): (Vec<_>, Vec<_>) = std::mem::take(pool)
            .into_iter()
            .partition(|p| p.country == country);
        *pool = rest;
        debug!("domestic circle {}: {} members", country, members.len());
        Self {
            country,
            circle: Circle::new(members),
        }
    }

    /// Circle created on demand for participants re-homed from elsewhere.
    pub fn seeded(country: impl Into<String>, members: Vec<Participant>) -> Self {
        Self {
            country: country.into(),
            circle: Circle::new(members),
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn members(&self) -> &[Participant] {
        self.circle.members()
    }

    pub fn len(&self) -> usize {
        self.circle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circle.is_empty()
    }

    pub fn extend(&mut self, participants: impl IntoIterator<Item = Participant>) {
        self.circle.extend(participants);
    }

    pub fn rotate(&self) -> Vec<GiftLink<'_>> {
        self.circle.rotate()
    }

    pub fn take_lone(&mut self) -> Option<Participant> {
        self.circle.take_lone()
    }

    /// Flag and remove the sole member of a one-member circle.
    pub fn take_rejects(&mut self) -> Vec<Participant> {
        self.circle.reject_lone()
    }
}

/// Circle of internationally shipping participants, ordered so that
/// neighbours come from different countries.
#[derive(Debug, PartialEq, Eq)]
pub struct InternationalCircle {
    circle: Circle,
    overflow_rejects: Vec<Participant>,
    forced_repeats: usize,
}

impl InternationalCircle {
    pub fn new(pool: Vec<Participant>, pick: NonLargestPick) -> Self {
        let result = FairInterleaver::new(pool, |p: &Participant| p.country.clone())
            .with_pick(pick)
            .compute();
        debug!(
            "international circle: {} members, {} overflow",
            result.sorted.len(),
            result.rejects.len()
        );
        Self {
            circle: Circle::new(result.sorted),
            overflow_rejects: result.rejects,
            forced_repeats: result.forced_repeats,
        }
    }

    pub fn members(&self) -> &[Participant] {
        self.circle.members()
    }

    /// Participants removed by the interleaver and not yet taken.
    pub fn overflow_rejects(&self) -> &[Participant] {
        &self.overflow_rejects
    }

    /// Places where the interleaver had to seat two compatriots side by side.
    pub fn forced_repeats(&self) -> usize {
        self.forced_repeats
    }

    pub fn len(&self) -> usize {
        self.circle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circle.is_empty()
    }

    pub fn extend(&mut self, participants: impl IntoIterator<Item = Participant>) {
        self.circle.extend(participants);
    }

    pub fn rotate(&self) -> Vec<GiftLink<'_>> {
        self.circle.rotate()
    }

    pub fn take_lone(&mut self) -> Option<Participant> {
        self.circle.take_lone()
    }

    /// Flag and hand out the rejects of this circle.
    ///
    /// Overflow from the interleaver takes precedence: when present, the
    /// one-member rule is not evaluated.
    pub fn take_rejects(&mut self) -> Vec<Participant> {
        if self.overflow_rejects.is_empty() {
            return self.circle.reject_lone();
        }
        let mut rejects = std::mem::take(&mut self.overflow_rejects);
        for p in &mut rejects {
            p.mark_reject();
        }
        rejects
    }
}
