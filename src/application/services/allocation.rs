//! Allocation service
//!
//! Splits participants into domestic and international circles, re-homes
//! rejects between them and rotates every circle into gift links.

use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

use crate::domain::{DomesticCircle, GiftLink, InternationalCircle, NonLargestPick, Participant};

/// Which kind of circle a rotation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleKind {
    Domestic,
    International,
}

/// Gift links of one circle.
#[derive(Debug, Clone)]
pub struct Rotation<'a> {
    pub kind: CircleKind,
    /// Country of a domestic circle
    pub country: Option<&'a str>,
    pub links: Vec<GiftLink<'a>>,
}

impl Rotation<'_> {
    pub fn label(&self) -> String {
        match (self.kind, self.country) {
            (CircleKind::Domestic, Some(country)) => format!("Domestic Circle {country}"),
            (CircleKind::Domestic, None) => "Domestic Circle".to_string(),
            (CircleKind::International, _) => "International Circle".to_string(),
        }
    }
}

/// Counts describing one allocation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationSummary {
    pub participants: usize,
    pub domestic_circles: usize,
    pub international_members: usize,
    pub links: usize,
    pub domestic_rejects: usize,
    pub international_rejects: usize,
    pub unmatched: usize,
    pub forced_repeats: usize,
}

/// Final circles of an allocation run.
#[derive(Debug)]
pub struct Allocation {
    domestic: Vec<DomesticCircle>,
    international: InternationalCircle,
    unmatched: Vec<Participant>,
    domestic_rejects: usize,
    international_rejects: usize,
}

impl Allocation {
    pub fn domestic(&self) -> &[DomesticCircle] {
        &self.domestic
    }

    pub fn domestic_circle(&self, country: &str) -> Option<&DomesticCircle> {
        self.domestic.iter().find(|c| c.country() == country)
    }

    pub fn international(&self) -> &InternationalCircle {
        &self.international
    }

    /// Participants left without any valid circle.
    pub fn unmatched(&self) -> &[Participant] {
        &self.unmatched
    }

    /// Gift links of every circle: domestic circles first, then the
    /// international circle.
    pub fn rotations(&self) -> Vec<Rotation<'_>> {
        self.domestic
            .iter()
            .map(|circle| Rotation {
                kind: CircleKind::Domestic,
                country: Some(circle.country()),
                links: circle.rotate(),
            })
            .chain(std::iter::once(Rotation {
                kind: CircleKind::International,
                country: None,
                links: self.international.rotate(),
            }))
            .collect()
    }

    pub fn link_count(&self) -> usize {
        self.domestic.iter().map(DomesticCircle::len).sum::<usize>() + self.international.len()
    }

    /// Every participant of the run, wherever it ended up.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.domestic
            .iter()
            .flat_map(|c| c.members())
            .chain(self.international.members())
            .chain(self.unmatched.iter())
    }

    pub fn participant_count(&self) -> usize {
        self.participants().count()
    }

    /// Participants flagged as rejects during the run.
    pub fn rejects(&self) -> impl Iterator<Item = &Participant> {
        self.participants().filter(|p| p.is_reject())
    }

    pub fn summary(&self) -> AllocationSummary {
        AllocationSummary {
            participants: self.participant_count(),
            domestic_circles: self.domestic.iter().filter(|c| !c.is_empty()).count(),
            international_members: self.international.len(),
            links: self.link_count(),
            domestic_rejects: self.domestic_rejects,
            international_rejects: self.international_rejects,
            unmatched: self.unmatched.len(),
            forced_repeats: self.international.forced_repeats(),
        }
    }
}

/// Service allocating participants to gift circles.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationService {
    pick: NonLargestPick,
}

impl AllocationService {
    pub fn new(pick: NonLargestPick) -> Self {
        Self { pick }
    }

    /// Allocate participants to circles.
    ///
    /// 1. split by international eligibility
    /// 2. interleave the international pool by country
    /// 3. one domestic circle per country of the domestic-only pool
    /// 4. collect rejects of every circle
    /// 5. re-home: international rejects join their domestic circle,
    ///    domestic rejects join the international circle
    /// 6. flag members left alone in a circle: a lone international member
    ///    joins its domestic circle, anyone else is unmatched
    #[instrument(skip_all, fields(participants = participants.len()))]
    pub fn allocate(&self, participants: Vec<Participant>) -> Allocation {
        let (international_pool, mut domestic_pool): (Vec<_>, Vec<_>) = participants
            .into_iter()
            .partition(|p| p.eligible_international);
        debug!(
            "pools: {} international, {} domestic",
            international_pool.len(),
            domestic_pool.len()
        );

        let mut international = InternationalCircle::new(international_pool, self.pick);

        let countries: Vec<String> = domestic_pool
            .iter()
            .map(|p| p.country.clone())
            .unique()
            .collect();
        let mut domestic: Vec<DomesticCircle> = countries
            .into_iter()
            .map(|country| DomesticCircle::from_pool(country, &mut domestic_pool))
            .collect();

        let domestic_rejects: Vec<Participant> = domestic
            .iter_mut()
            .flat_map(DomesticCircle::take_rejects)
            .collect();
        let international_rejects = international.take_rejects();
        let (domestic_reject_count, international_reject_count) =
            (domestic_rejects.len(), international_rejects.len());
        debug!(
            "rejects: {} domestic, {} international",
            domestic_reject_count, international_reject_count
        );

        let mut domestic = rehome_to_domestic(domestic, international_rejects);
        international.extend(domestic_rejects);
        let unmatched = resolve_lone_members(&mut domestic, &mut international);

        let allocation = Allocation {
            domestic,
            international,
            unmatched,
            domestic_rejects: domestic_reject_count,
            international_rejects: international_reject_count,
        };
        info!("allocation: {:?}", allocation.summary());
        allocation
    }
}

/// Move rejects of the international circle into the domestic circle of
/// their country, creating that circle when none exists.
///
/// Returns the updated collection of domestic circles.
fn rehome_to_domestic(
    mut circles: Vec<DomesticCircle>,
    rejects: Vec<Participant>,
) -> Vec<DomesticCircle> {
    for reject in rejects {
        match circles.iter_mut().find(|c| c.country() == reject.country) {
            Some(circle) => circle.extend([reject]),
            None => {
                debug!("creating domestic circle {} for rejects", reject.country);
                let country = reject.country.clone();
                circles.push(DomesticCircle::seeded(country, vec![reject]));
            }
        }
    }
    circles
}

/// No circle may be rotated with a single member.
///
/// After re-homing, a domestic circle holding one member holds a reject of
/// the international circle. It never returns there and is reported
/// unmatched. A lone international member is flagged and moves to its
/// non-empty domestic circle, or is unmatched when there is none.
fn resolve_lone_members(
    domestic: &mut [DomesticCircle],
    international: &mut InternationalCircle,
) -> Vec<Participant> {
    let mut unmatched = Vec::new();
    for circle in domestic.iter_mut() {
        if let Some(mut lone) = circle.take_lone() {
            lone.mark_reject();
            warn!("domestic circle {} holds only {}", circle.country(), lone);
            unmatched.push(lone);
        }
    }

    if let Some(mut lone) = international.take_lone() {
        lone.mark_reject();
        match domestic
            .iter_mut()
            .find(|c| c.country() == lone.country && !c.is_empty())
        {
            Some(circle) => {
                warn!(
                    "international circle holds only {}, moving to domestic circle {}",
                    lone,
                    circle.country()
                );
                circle.extend([lone]);
            }
            None => {
                warn!("no circle left for {}", lone);
                unmatched.push(lone);
            }
        }
    }
    unmatched
}
