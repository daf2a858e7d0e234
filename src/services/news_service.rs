use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{Duration, Utc};
use futures_util::future::join_all;

use crate::models::{RawArticle, SelectedArticle};
use crate::AppState;

pub const MAX_DIGEST_ARTICLES: usize = 6;
pub const GENERAL_DEDUPE_CAP: usize = 20;

const NEWS_LOOKBACK_DAYS: i64 = 5;

/// Produce at most `limit` articles for a symbol set.
///
/// With symbols: each symbol's candidate list is fetched concurrently and
/// independently (a failed fetch contributes an empty list), filtered to
/// valid articles, then drained round-robin in stable symbol order and
/// finally sorted newest-first. When no symbol yields anything, or no
/// symbols were given, the undifferentiated general feed is used instead.
pub async fn select_articles(
    state: &AppState,
    symbols: &[String],
    limit: usize,
) -> Result<Vec<SelectedArticle>, String> {
    let clean: Vec<String> = symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if !clean.is_empty() {
        let to = Utc::now().date_naive();
        let from = to - Duration::days(NEWS_LOOKBACK_DAYS);

        let fetches = clean.iter().map(|sym| {
            let sym = sym.clone();
            async move {
                let articles = match state.finnhub.company_news(&sym, from, to).await {
                    Ok(list) => list.into_iter().filter(RawArticle::is_valid).collect(),
                    Err(e) => {
                        tracing::warn!(
                            symbol = %sym,
                            error = %e,
                            "company news fetch failed; symbol contributes nothing this run"
                        );
                        Vec::new()
                    }
                };
                (sym, articles)
            }
        });

        let by_symbol: HashMap<String, VecDeque<RawArticle>> = join_all(fetches)
            .await
            .into_iter()
            .map(|(sym, list)| (sym, VecDeque::from(list)))
            .collect();

        let mut selected = round_robin_select(&clean, by_symbol, limit);
        if !selected.is_empty() {
            selected.sort_by(|a, b| b.article.datetime.cmp(&a.article.datetime));
            return Ok(selected);
        }
        // No symbol yielded anything: fall through to the general feed.
    }

    let general = state.finnhub.general_news().await?;
    let unique = dedupe_general(general, GENERAL_DEDUPE_CAP);

    Ok(unique
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, article)| SelectedArticle {
            article,
            symbol: None,
            selection_round: idx,
        })
        .collect())
}

/// Drain per-symbol queues one article per symbol per round, in the given
/// symbol order, until `limit` picks or every queue is empty. The symbol
/// order is stable across rounds (the first-listed symbol is tried first
/// each round); this is an observable tie-break, not an accident.
pub fn round_robin_select(
    symbols: &[String],
    mut by_symbol: HashMap<String, VecDeque<RawArticle>>,
    limit: usize,
) -> Vec<SelectedArticle> {
    let mut selected: Vec<SelectedArticle> = Vec::new();
    if limit == 0 {
        return selected;
    }

    let mut round = 0;
    loop {
        let mut picked_any = false;

        for sym in symbols {
            if selected.len() >= limit {
                return selected;
            }

            let Some(queue) = by_symbol.get_mut(sym) else {
                continue;
            };
            let Some(article) = queue.pop_front() else {
                continue;
            };

            picked_any = true;
            selected.push(SelectedArticle {
                article,
                symbol: Some(sym.clone()),
                selection_round: round,
            });
        }

        if !picked_any {
            return selected;
        }
        round += 1;
    }
}

/// Filter the general feed to valid articles and drop duplicates by the
/// composite (id, url, headline) key, keeping first occurrences, capped
/// at `cap` entries before the caller takes its final slice.
pub fn dedupe_general(articles: Vec<RawArticle>, cap: usize) -> Vec<RawArticle> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<RawArticle> = Vec::new();

    for article in articles {
        if !article.is_valid() {
            continue;
        }
        if !seen.insert(article.dedupe_key()) {
            continue;
        }
        unique.push(article);
        if unique.len() >= cap {
            break;
        }
    }

    unique
}
