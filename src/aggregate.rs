use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::models::{BestOdds, Match, PriceComparison, Quote};

/// Roll the stored quotes up into one `BestOdds` per match.
///
/// Quotes whose match is not (yet) in the match table are skipped. Home and
/// away prices compete unconditionally; a draw price competes only when it
/// is greater than zero, so an unoffered draw market can never initialize or
/// win the comparison. When two sites post the same best price the first one
/// seen keeps it; the iteration order behind "first seen" is unspecified, as
/// is the order of the returned rollups.
pub fn best_odds(
    matches: &HashMap<String, Match>,
    quotes_by_source: &HashMap<String, Vec<Quote>>,
) -> Vec<BestOdds> {
    let mut by_match: HashMap<String, BestOdds> = HashMap::new();

    for quote in quotes_by_source.values().flatten() {
        let Some(m) = matches.get(&quote.match_id) else {
            continue;
        };

        let entry = by_match
            .entry(quote.match_id.clone())
            .or_insert_with(|| BestOdds {
                match_info: m.clone(),
                best_home_win: None,
                best_draw: None,
                best_away_win: None,
                all_odds: Vec::new(),
                updated_at: Utc::now(),
            });
        entry.all_odds.push(quote.clone());

        if entry
            .best_home_win
            .as_ref()
            .map_or(true, |best| quote.home_win > best.value)
        {
            entry.best_home_win = Some(comparison(quote.home_win, quote));
        }

        if let Some(draw) = quote.draw.filter(|d| *d > Decimal::ZERO) {
            if entry
                .best_draw
                .as_ref()
                .map_or(true, |best| draw > best.value)
            {
                entry.best_draw = Some(comparison(draw, quote));
            }
        }

        if entry
            .best_away_win
            .as_ref()
            .map_or(true, |best| quote.away_win > best.value)
        {
            entry.best_away_win = Some(comparison(quote.away_win, quote));
        }
    }

    by_match.into_values().collect()
}

fn comparison(value: Decimal, quote: &Quote) -> PriceComparison {
    PriceComparison {
        value,
        source_id: quote.source_id.clone(),
        source_name: quote.source_name.clone(),
    }
}
