//! Options-flow analysis.
//!
//! Aggregates a batch of options-flow records into whale, sentiment,
//! volume, premium, timing, unusual-activity, gamma and strategy views,
//! plus one overall directional signal. An empty batch yields
//! [`FlowAnalysisResult::empty`] with a `NO_DATA` signal.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use tracing::debug;

use crate::types::{
    FlowAnalysisResult, FlowSentiment, FlowSignal, FlowSignalLabel, FlowStrategy, GammaExposure,
    GammaImplication, OptionsFlowRecord, PremiumFlow, SentimentAnalysis, SignalComponents,
    Significance, StrategyImplication, TimeAnalysis, UnusualFinding, UnusualKind, VolumeAnalysis,
    WhaleActivity,
};

/// Signal weights. The time-decay weight is defined but takes no part in
/// the combination.
const SENTIMENT_WEIGHT: f64 = 0.3;
const VOLUME_WEIGHT: f64 = 0.25;
const PREMIUM_WEIGHT: f64 = 0.25;

/// Ratio reported when the denominator side is empty but the numerator is not.
const RATIO_SENTINEL: f64 = 999.0;

const ONE_HOUR_MS: i64 = 3_600_000;
const SHORT_TERM_DAYS: i64 = 7;

/// Per-key running totals in first-seen key order.
struct Tally<K> {
    index: HashMap<K, usize>,
    totals: Vec<(K, f64)>,
}

impl<K: Clone + Eq + Hash> Tally<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            totals: Vec::new(),
        }
    }

    fn add(&mut self, key: K, value: f64) {
        match self.index.get(&key) {
            Some(&i) => self.totals[i].1 += value,
            None => {
                self.index.insert(key.clone(), self.totals.len());
                self.totals.push((key, value));
            }
        }
    }

    fn len(&self) -> usize {
        self.totals.len()
    }

    /// Largest group; ties keep the earlier key.
    fn largest(&self) -> Option<(K, f64)> {
        let mut best: Option<&(K, f64)> = None;
        for entry in &self.totals {
            if best.map_or(true, |(_, b)| entry.1 > *b) {
                best = Some(entry);
            }
        }
        best.cloned()
    }

    fn into_totals(self) -> Vec<(K, f64)> {
        self.totals
    }
}

/// Strike as a map key, `480` or `482.5`.
fn strike_key(strike: f64) -> String {
    format!("{}", strike)
}

fn ratio(numerator: f64, denominator: f64, empty: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else if numerator > 0.0 {
        RATIO_SENTINEL
    } else {
        empty
    }
}

/// Thresholds for whale and sweep detection.
#[derive(Debug, Clone, Copy)]
pub struct FlowAnalyzer {
    /// Minimum premium of a whale flow.
    pub whale_premium: f64,
    /// Minimum contracts of a whale flow.
    pub whale_volume: f64,
    /// Contracts above which a single record is a sweep.
    pub sweep_volume: f64,
    /// Premium above which a single record is a sweep.
    pub sweep_premium: f64,
}

impl Default for FlowAnalyzer {
    fn default() -> Self {
        Self {
            whale_premium: 50_000.0,
            whale_volume: 100.0,
            sweep_volume: 500.0,
            sweep_premium: 100_000.0,
        }
    }
}

impl FlowAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze `records` as of `now`.
    pub fn analyze(&self, records: &[OptionsFlowRecord], now: DateTime<Utc>) -> FlowAnalysisResult {
        if records.is_empty() {
            return FlowAnalysisResult::empty();
        }

        let whale_activity = self.whale_activity(records);
        let sentiment_analysis = Self::sentiment(records);
        let volume_analysis = Self::volume(records);

        let overall_signal =
            Self::overall_signal(&sentiment_analysis, &whale_activity, &volume_analysis);

        debug!(
            "Analyzed {} flow records: {:?} (score {:.3}, {} whale flows)",
            records.len(),
            overall_signal.signal,
            overall_signal.score,
            whale_activity.total_whale_flows
        );

        FlowAnalysisResult {
            premium_flow: self.premium_flow(records),
            time_analysis: Self::time_patterns(records, now),
            unusual_activity: self.unusual_activity(records, now),
            gamma_exposure: Self::gamma_exposure(records),
            strategies: self.strategies(records),
            whale_activity,
            sentiment_analysis,
            volume_analysis,
            overall_signal,
        }
    }

    fn is_whale(&self, record: &OptionsFlowRecord) -> bool {
        record.premium >= self.whale_premium || record.volume >= self.whale_volume
    }

    pub fn whale_activity(&self, records: &[OptionsFlowRecord]) -> WhaleActivity {
        let whales: Vec<&OptionsFlowRecord> = records.iter().filter(|r| self.is_whale(r)).collect();

        let total: f64 = whales.iter().map(|r| r.premium).sum();
        let calls: f64 = whales.iter().filter(|r| r.is_call()).map(|r| r.premium).sum();
        let puts: f64 = whales.iter().filter(|r| r.is_put()).map(|r| r.premium).sum();

        WhaleActivity {
            total_whale_flows: whales.len(),
            total_whale_premium: total,
            whale_call_premium: calls,
            whale_put_premium: puts,
            whale_call_put_ratio: ratio(calls, puts, 0.0),
            average_whale_premium: if whales.is_empty() {
                0.0
            } else {
                total / whales.len() as f64
            },
            largest_flow: whales.iter().map(|r| r.premium).fold(0.0, f64::max),
            whale_flows: whales.into_iter().take(10).cloned().collect(),
        }
    }

    pub fn sentiment(records: &[OptionsFlowRecord]) -> SentimentAnalysis {
        let calls: Vec<&OptionsFlowRecord> = records.iter().filter(|r| r.is_call()).collect();
        let puts: Vec<&OptionsFlowRecord> = records.iter().filter(|r| r.is_put()).collect();

        let call_volume: f64 = calls.iter().map(|r| r.volume).sum();
        let put_volume: f64 = puts.iter().map(|r| r.volume).sum();
        let call_premium: f64 = calls.iter().map(|r| r.premium).sum();
        let put_premium: f64 = puts.iter().map(|r| r.premium).sum();

        let call_put_ratio = ratio(call_volume, put_volume, 1.0);
        let premium_ratio = ratio(call_premium, put_premium, 1.0);

        let mut score: f64 = 50.0;
        score += if call_put_ratio > 1.5 {
            15.0
        } else if call_put_ratio > 1.2 {
            10.0
        } else if call_put_ratio > 1.0 {
            5.0
        } else if call_put_ratio < 0.7 {
            -15.0
        } else if call_put_ratio < 0.8 {
            -10.0
        } else if call_put_ratio < 0.9 {
            -5.0
        } else {
            0.0
        };
        if premium_ratio > 2.0 {
            score += 10.0;
        } else if premium_ratio < 0.5 {
            score -= 10.0;
        }
        let score = score.clamp(0.0, 100.0);

        SentimentAnalysis {
            call_count: calls.len(),
            put_count: puts.len(),
            call_volume,
            put_volume,
            call_premium,
            put_premium,
            call_put_ratio,
            premium_ratio,
            sentiment_score: score,
            sentiment: FlowSentiment::from_score(score),
        }
    }

    pub fn volume(records: &[OptionsFlowRecord]) -> VolumeAnalysis {
        let total_volume: f64 = records.iter().map(|r| r.volume).sum();

        let mut by_strike = Tally::new();
        let mut max_strike = 0.0;
        for record in records.iter().filter(|r| r.strike > 0.0) {
            by_strike.add(strike_key(record.strike), record.volume);
        }
        let (max_key, max_amount) = by_strike.largest().unwrap_or((String::new(), 0.0));
        if let Some(record) = records.iter().find(|r| strike_key(r.strike) == max_key) {
            max_strike = record.strike;
        }

        VolumeAnalysis {
            total_volume,
            total_contracts: records.len(),
            avg_volume_per_contract: if records.is_empty() {
                0.0
            } else {
                total_volume / records.len() as f64
            },
            max_volume_strike: max_strike,
            max_volume_amount: max_amount,
            strike_distribution: by_strike.len(),
            volume_concentration: if total_volume > 0.0 {
                max_amount / total_volume
            } else {
                0.0
            },
        }
    }

    pub fn premium_flow(&self, records: &[OptionsFlowRecord]) -> PremiumFlow {
        let total_premium: f64 = records.iter().map(|r| r.premium).sum();

        let mut distribution = BTreeMap::new();
        for record in records.iter().filter(|r| r.strike > 0.0 && r.premium > 0.0) {
            *distribution.entry(strike_key(record.strike)).or_insert(0.0) += record.premium;
        }

        let mut largest_flow: Option<&OptionsFlowRecord> = None;
        for record in records {
            if largest_flow.map_or(true, |best| record.premium > best.premium) {
                largest_flow = Some(record);
            }
        }

        PremiumFlow {
            total_premium,
            avg_premium_per_flow: if records.is_empty() {
                0.0
            } else {
                total_premium / records.len() as f64
            },
            largest_premium_flow: largest_flow.cloned(),
            premium_distribution: distribution,
            high_premium_flows: records
                .iter()
                .filter(|r| r.premium > self.whale_premium)
                .count(),
        }
    }

    pub fn time_patterns(records: &[OptionsFlowRecord], now: DateTime<Utc>) -> TimeAnalysis {
        let now_ms = now.timestamp_millis();
        let recent = records
            .iter()
            .filter(|r| now_ms - r.timestamp.unwrap_or(now_ms) < ONE_HOUR_MS)
            .count();

        let mut by_expiration = Tally::new();
        for record in records {
            let key = record
                .expiration
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "unknown".to_string());
            by_expiration.add(key, 1.0);
        }

        let most_popular = by_expiration
            .largest()
            .map(|(key, _)| key)
            .unwrap_or_else(|| "unknown".to_string());
        let by_expiration = by_expiration.into_totals();
        let short_term = by_expiration
            .iter()
            .filter(|(key, _)| is_short_term(key, now))
            .count();

        TimeAnalysis {
            total_flows: records.len(),
            recent_flows: recent,
            recent_activity: if records.is_empty() {
                0.0
            } else {
                recent as f64 / records.len() as f64
            },
            expiration_distribution: by_expiration
                .into_iter()
                .map(|(key, count)| (key, count as usize))
                .collect(),
            most_popular_expiration: most_popular,
            short_term_flows: short_term,
        }
    }

    pub fn unusual_activity(
        &self,
        records: &[OptionsFlowRecord],
        now: DateTime<Utc>,
    ) -> Vec<UnusualFinding> {
        let mut findings = Vec::new();
        let n = records.len() as f64;

        let large_threshold = self.whale_premium * 2.0;
        let large = records.iter().filter(|r| r.premium > large_threshold).count();
        if large > 0 {
            findings.push(UnusualFinding {
                kind: UnusualKind::LargeTrades,
                count: large,
                description: format!("{} trades with premium > ${}", large, large_threshold),
                significance: Significance::High,
            });
        }

        let mut strikes = Tally::new();
        for record in records {
            strikes.add(strike_key(record.strike), 1.0);
        }
        if let Some((_, count)) = strikes.largest() {
            if count > n * 0.3 {
                findings.push(UnusualFinding {
                    kind: UnusualKind::StrikeConcentration,
                    count: count as usize,
                    description: "Heavy concentration at single strike level".to_string(),
                    significance: Significance::Medium,
                });
            }
        }

        let mut hours = Tally::new();
        for record in records {
            let time = record
                .timestamp
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .unwrap_or(now);
            hours.add(time.hour(), 1.0);
        }
        if let Some((_, count)) = hours.largest() {
            if count > n * 0.5 {
                findings.push(UnusualFinding {
                    kind: UnusualKind::TimeConcentration,
                    count: count as usize,
                    description: "Heavy activity concentrated in single hour".to_string(),
                    significance: Significance::Medium,
                });
            }
        }

        findings
    }

    /// Net call minus put contracts as a dealer gamma proxy.
    pub fn gamma_exposure(records: &[OptionsFlowRecord]) -> GammaExposure {
        let call_gamma: f64 = records.iter().filter(|r| r.is_call()).map(|r| r.volume).sum();
        let put_gamma: f64 = records.iter().filter(|r| r.is_put()).map(|r| r.volume).sum();
        let net_gamma = call_gamma - put_gamma;

        GammaExposure {
            call_gamma,
            put_gamma,
            net_gamma,
            gamma_implication: if net_gamma > 1000.0 {
                GammaImplication::PositiveGamma
            } else if net_gamma < -1000.0 {
                GammaImplication::NegativeGamma
            } else {
                GammaImplication::NeutralGamma
            },
            volatility_impact: if net_gamma.abs() > 2000.0 {
                Significance::High
            } else if net_gamma.abs() > 500.0 {
                Significance::Medium
            } else {
                Significance::Low
            },
        }
    }

    /// Straddles, strangles and sweeps per symbol with at least two records.
    pub fn strategies(&self, records: &[OptionsFlowRecord]) -> Vec<FlowStrategy> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<&OptionsFlowRecord>)> = Vec::new();
        for record in records {
            let symbol = if record.symbol.is_empty() {
                "UNKNOWN"
            } else {
                record.symbol.as_str()
            };
            match index.get(symbol) {
                Some(&i) => groups[i].1.push(record),
                None => {
                    index.insert(symbol, groups.len());
                    groups.push((symbol, vec![record]));
                }
            }
        }

        let mut strategies = Vec::new();
        for (symbol, flows) in groups {
            if flows.len() < 2 {
                continue;
            }

            let call_strikes: Vec<f64> = flows.iter().filter(|r| r.is_call()).map(|r| r.strike).collect();
            let put_strikes: Vec<f64> = flows.iter().filter(|r| r.is_put()).map(|r| r.strike).collect();

            if !call_strikes.is_empty() && !put_strikes.is_empty() {
                let put_keys: HashSet<String> = put_strikes.iter().map(|s| strike_key(*s)).collect();
                let common: Vec<f64> = call_strikes
                    .iter()
                    .copied()
                    .filter(|s| put_keys.contains(&strike_key(*s)))
                    .collect();
                if !common.is_empty() {
                    strategies.push(FlowStrategy::LongStraddle {
                        symbol: symbol.to_string(),
                        strikes: common,
                        confidence: 80.0,
                        implication: StrategyImplication::VolatilityPlay,
                    });
                } else {
                    strategies.push(FlowStrategy::Strangle {
                        symbol: symbol.to_string(),
                        call_strikes: dedup(&call_strikes),
                        put_strikes: dedup(&put_strikes),
                        confidence: 70.0,
                        implication: StrategyImplication::VolatilityPlay,
                    });
                }
            }

            for flow in &flows {
                if flow.volume > self.sweep_volume || flow.premium > self.sweep_premium {
                    strategies.push(FlowStrategy::Sweep {
                        symbol: symbol.to_string(),
                        strike: flow.strike,
                        volume: flow.volume,
                        premium: flow.premium,
                        confidence: 90.0,
                        implication: StrategyImplication::DirectionalBet,
                    });
                }
            }
        }

        strategies
    }

    /// Weighted combination of sentiment, whale ratio and volume concentration.
    pub fn overall_signal(
        sentiment: &SentimentAnalysis,
        whales: &WhaleActivity,
        volume: &VolumeAnalysis,
    ) -> FlowSignal {
        let mut bullish = 0.0;
        let mut bearish = 0.0;

        let score = sentiment.sentiment_score;
        if score > 60.0 {
            bullish += SENTIMENT_WEIGHT * (score - 50.0) / 50.0;
        } else if score < 40.0 {
            bearish += SENTIMENT_WEIGHT * (50.0 - score) / 50.0;
        }

        if whales.whale_call_put_ratio > 1.5 {
            bullish += PREMIUM_WEIGHT * 0.8;
        } else if whales.whale_call_put_ratio < 0.7 {
            bearish += PREMIUM_WEIGHT * 0.8;
        }

        if volume.volume_concentration > 0.7 {
            if score > 50.0 {
                bullish += VOLUME_WEIGHT * 0.6;
            } else {
                bearish += VOLUME_WEIGHT * 0.6;
            }
        }

        let total_weight = SENTIMENT_WEIGHT + PREMIUM_WEIGHT + VOLUME_WEIGHT;
        let final_score = (bullish - bearish) / total_weight;

        FlowSignal {
            signal: FlowSignalLabel::from_score(final_score),
            confidence: f64::min(final_score.abs() * 100.0, 95.0),
            score: final_score,
            components: SignalComponents {
                sentiment_contribution: (bullish - bearish) * SENTIMENT_WEIGHT,
                whale_contribution: whales.whale_call_put_ratio,
                volume_contribution: volume.volume_concentration,
            },
        }
    }
}

fn dedup(values: &[f64]) -> Vec<f64> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .copied()
        .filter(|v| seen.insert(strike_key(*v)))
        .collect()
}

/// Whether a `YYYY-MM-DD` expiration is at most a week away (or past).
fn is_short_term(expiration: &str, now: DateTime<Utc>) -> bool {
    NaiveDate::parse_from_str(expiration, "%Y-%m-%d")
        .map(|date| (date - now.date_naive()).num_days() <= SHORT_TERM_DAYS)
        .unwrap_or(false)
}

/// Analyze a batch as of the current time with default thresholds.
pub fn analyze_options_flow(records: &[OptionsFlowRecord]) -> FlowAnalysisResult {
    FlowAnalyzer::default().analyze(records, Utc::now())
}
