//! Synthetic fixtures shared by the stubbed adapters.

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Match, Quote, SiteIdentity};

pub(crate) struct Fixture {
    pub home: &'static str,
    pub away: &'static str,
    pub league: &'static str,
}

pub(crate) const FIXTURES: &[Fixture] = &[
    Fixture { home: "Arsenal", away: "Chelsea", league: "Premier League" },
    Fixture { home: "Manchester United", away: "Liverpool", league: "Premier League" },
    Fixture { home: "Barcelona", away: "Real Madrid", league: "La Liga" },
    Fixture { home: "Bayern Munich", away: "Borussia Dortmund", league: "Bundesliga" },
    Fixture { home: "PSG", away: "Marseille", league: "Ligue 1" },
    Fixture { home: "Juventus", away: "AC Milan", league: "Serie A" },
    Fixture { home: "Tottenham", away: "Manchester City", league: "Premier League" },
    Fixture { home: "Atletico Madrid", away: "Sevilla", league: "La Liga" },
    Fixture { home: "Inter Milan", away: "Napoli", league: "Serie A" },
    Fixture { home: "Leicester City", away: "West Ham", league: "Premier League" },
    Fixture { home: "Valencia", away: "Villarreal", league: "La Liga" },
    Fixture { home: "RB Leipzig", away: "Bayer Leverkusen", league: "Bundesliga" },
];

fn slug(team: &str) -> String {
    team.to_lowercase().replace(' ', "_")
}

/// Deterministic per fixture, so repeated fetches overwrite the same match
/// record. The site prefix keeps ids namespaced per source.
pub(crate) fn match_id(site_id: &str, fixture: &Fixture) -> String {
    format!("{}_{}_vs_{}", site_id, slug(fixture.home), slug(fixture.away))
}

/// Decimal odds from integer hundredths, e.g. 150..=350 -> 1.50..=3.50.
fn price(rng: &mut impl Rng, lo: i64, hi: i64) -> Decimal {
    Decimal::new(rng.gen_range(lo..=hi), 2)
}

/// Randomized batch for one site: 3..=8 distinct fixtures, one quote per
/// match, prices in realistic ranges shifted by a per-site offset.
pub(crate) fn batch(site: &SiteIdentity) -> (Vec<Match>, Vec<Quote>) {
    let mut rng = rand::thread_rng();
    let count = rng.gen_range(3..=8);

    // partial Fisher-Yates; the first `count` slots are the selection
    let mut picks: Vec<usize> = (0..FIXTURES.len()).collect();
    for i in 0..count {
        let j = rng.gen_range(i..picks.len());
        picks.swap(i, j);
    }

    let site_offset = Decimal::new(rng.gen_range(-10..=10), 2);
    let now = Utc::now();

    let mut matches = Vec::with_capacity(count);
    let mut quotes = Vec::with_capacity(count);
    for (i, &idx) in picks[..count].iter().enumerate() {
        let fixture = &FIXTURES[idx];
        let id = match_id(&site.id, fixture);

        matches.push(Match {
            id: id.clone(),
            home_team: fixture.home.to_string(),
            away_team: fixture.away.to_string(),
            sport: "football".to_string(),
            league: fixture.league.to_string(),
            start_time: now + chrono::Duration::hours(24 + (i as i64) * 6),
            status: "upcoming".to_string(),
        });

        let home_win = (price(&mut rng, 150, 350) + site_offset).max(Decimal::new(110, 2));
        let draw = (price(&mut rng, 300, 400) + site_offset).max(Decimal::new(250, 2));
        let away_win = (price(&mut rng, 150, 350) + site_offset).max(Decimal::new(110, 2));

        quotes.push(Quote {
            id: Uuid::new_v4(),
            match_id: id,
            source_id: site.id.clone(),
            source_name: site.name.clone(),
            home_win,
            draw: Some(draw),
            away_win,
            over_2_5: Some(price(&mut rng, 140, 220)),
            under_2_5: Some(price(&mut rng, 140, 220)),
            btts: Some(price(&mut rng, 150, 210)),
            quoted_at: now,
        });
    }

    (matches, quotes)
}
