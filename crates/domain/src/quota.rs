use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::{Clock, ReadError, SystemClock, UpdateError, clock};

#[allow(async_fn_in_trait)]
pub trait QuotaService {
    async fn get_quota_status(&self) -> Result<QuotaSnapshot, ReadError>;
    async fn check_quota(&self) -> Result<QuotaCheck, ReadError>;
    async fn increment_quota(&self) -> Result<QuotaUsage, UpdateError>;
    async fn get_cached_quota(&self) -> Result<Option<QuotaRecord>, ReadError>;
    async fn set_cached_quota(&self, record: &QuotaRecord) -> Result<(), UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait QuotaRepository {
    async fn read_quota_status(&self) -> Result<QuotaSnapshot, ReadError>;
    async fn check_quota(&self) -> Result<QuotaCheck, ReadError>;
    async fn increment_quota(&self) -> Result<QuotaUsage, UpdateError>;
    async fn read_cached_quota(&self) -> Result<Option<QuotaRecord>, ReadError>;
    async fn write_cached_quota(&self, record: &QuotaRecord) -> Result<(), UpdateError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    Unlimited,
    Limited(u32),
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allowance::Unlimited => write!(f, "unlimited"),
            Allowance::Limited(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaState {
    pub limit: Allowance,
    pub used: u32,
    pub remaining: Allowance,
    pub is_paid: bool,
    pub reset_time: Option<DateTime<Utc>>,
}

impl Default for QuotaState {
    fn default() -> Self {
        Self {
            limit: Allowance::Limited(QuotaState::DEFAULT_LIMIT),
            used: 0,
            remaining: Allowance::Limited(QuotaState::DEFAULT_LIMIT),
            is_paid: false,
            reset_time: None,
        }
    }
}

impl QuotaState {
    pub const DEFAULT_LIMIT: u32 = 5;

    /// Analyses left for gating purposes. An unlimited allowance only counts for paid accounts.
    #[must_use]
    pub fn remaining_count(&self) -> u32 {
        match self.remaining {
            Allowance::Limited(remaining) => remaining,
            Allowance::Unlimited => 0,
        }
    }
}

/// Server view of the quota as returned by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub limit: Allowance,
    pub used: u32,
    pub remaining: Allowance,
    pub is_paid: bool,
    pub reset_time: Option<DateTime<Utc>>,
}

impl From<QuotaSnapshot> for QuotaState {
    fn from(value: QuotaSnapshot) -> Self {
        Self {
            limit: value.limit,
            used: value.used,
            remaining: value.remaining,
            is_paid: value.is_paid,
            reset_time: value.reset_time,
        }
    }
}

/// Quota after the server recorded a usage. The reset time is not part of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaUsage {
    pub limit: Allowance,
    pub used: u32,
    pub remaining: Allowance,
    pub is_paid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    pub allowed: bool,
    pub snapshot: QuotaSnapshot,
}

/// Persisted form of a mirror.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuotaRecord {
    pub state: QuotaState,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Uninitialized,
    Fresh,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaMessage {
    Unlimited { used: u32 },
    LimitReached,
    Remaining { remaining: u32, limit: Allowance },
}

impl fmt::Display for QuotaMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaMessage::Unlimited { used } => {
                write!(f, "Unlimited analyses ({used} used today)")
            }
            QuotaMessage::LimitReached => write!(f, "Daily limit reached"),
            QuotaMessage::Remaining { remaining, limit } => {
                write!(f, "{remaining} of {limit} analyses remaining today")
            }
        }
    }
}

/// Local mirror of the server-issued analysis quota.
///
/// Gating decisions are answered from the mirror. Server responses are authoritative writes
/// and always replace the state, local optimistic increments are tentative until the next
/// authoritative write. Every write bumps the generation.
#[derive(Debug)]
pub struct QuotaMirror<C: Clock = SystemClock> {
    state: QuotaState,
    last_fetched_at: Option<DateTime<Utc>>,
    generation: u64,
    pending_generation: Option<u64>,
    clock: C,
}

impl QuotaMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for QuotaMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> QuotaMirror<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::restore(QuotaRecord::default(), clock)
    }

    pub fn restore(record: QuotaRecord, clock: C) -> Self {
        Self {
            state: record.state,
            last_fetched_at: record.last_fetched_at,
            generation: 0,
            pending_generation: None,
            clock,
        }
    }

    #[must_use]
    pub fn state(&self) -> &QuotaState {
        &self.state
    }

    #[must_use]
    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetched_at
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the last tentative write not yet overridden by the server.
    #[must_use]
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending_generation
    }

    #[must_use]
    pub fn is_provisional(&self) -> bool {
        self.pending_generation.is_some()
    }

    #[must_use]
    pub fn record(&self) -> QuotaRecord {
        QuotaRecord {
            state: self.state,
            last_fetched_at: self.last_fetched_at,
        }
    }

    pub fn load(&mut self, snapshot: QuotaSnapshot) {
        self.authoritative_write(snapshot.into());
    }

    pub fn apply_usage(&mut self, usage: QuotaUsage) {
        self.authoritative_write(QuotaState {
            limit: usage.limit,
            used: usage.used,
            remaining: usage.remaining,
            is_paid: usage.is_paid,
            reset_time: self.state.reset_time,
        });
    }

    pub fn optimistic_increment(&mut self) {
        self.state.used = self.state.used.saturating_add(1);
        self.state.remaining = if self.state.is_paid {
            Allowance::Unlimited
        } else {
            Allowance::Limited(self.state.remaining_count().saturating_sub(1))
        };
        self.generation += 1;
        self.pending_generation = Some(self.generation);
    }

    pub fn reset(&mut self) {
        self.state = QuotaState::default();
        self.last_fetched_at = None;
        self.generation += 1;
        self.pending_generation = None;
    }

    #[must_use]
    pub fn can_analyze(&self) -> bool {
        self.state.is_paid || self.state.remaining_count() > 0
    }

    /// Unlimited for display purposes. Admission is decided by `can_analyze` alone.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.state.is_paid || self.state.limit == Allowance::Unlimited
    }

    #[must_use]
    pub fn quota_message(&self) -> QuotaMessage {
        if self.is_unlimited() {
            return QuotaMessage::Unlimited {
                used: self.state.used,
            };
        }
        match self.state.remaining_count() {
            0 => QuotaMessage::LimitReached,
            remaining => QuotaMessage::Remaining {
                remaining,
                limit: self.state.limit,
            },
        }
    }

    #[must_use]
    pub fn freshness(&self, max_age: Duration) -> Freshness {
        match self.last_fetched_at {
            None => Freshness::Uninitialized,
            Some(_) if self.is_stale(max_age) => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        }
    }

    #[must_use]
    pub fn is_stale(&self, max_age: Duration) -> bool {
        clock::is_stale(self.last_fetched_at, self.clock.now(), max_age)
    }

    /// Fetches the quota status if the mirror is stale. Returns whether a fetch happened.
    pub async fn refresh_if_stale(
        &mut self,
        service: &impl QuotaService,
        max_age: Duration,
    ) -> Result<bool, ReadError> {
        if !self.is_stale(max_age) {
            return Ok(false);
        }
        let snapshot = service.get_quota_status().await?;
        self.load(snapshot);
        Ok(true)
    }

    pub async fn check(&mut self, service: &impl QuotaService) -> Result<bool, ReadError> {
        let check = service.check_quota().await?;
        self.load(check.snapshot);
        Ok(check.allowed)
    }

    /// Records one analysis locally and confirms it with the server.
    ///
    /// If the server cannot be reached, the tentative state is kept until the next load.
    pub async fn consume(&mut self, service: &impl QuotaService) -> Result<(), UpdateError> {
        self.optimistic_increment();
        let usage = service.increment_quota().await?;
        self.apply_usage(usage);
        Ok(())
    }

    pub async fn persist(&self, service: &impl QuotaService) -> Result<(), UpdateError> {
        service.set_cached_quota(&self.record()).await
    }

    pub async fn restore_from(service: &impl QuotaService, clock: C) -> Result<Self, ReadError> {
        let record = service.get_cached_quota().await?.unwrap_or_default();
        Ok(Self::restore(record, clock))
    }

    fn authoritative_write(&mut self, state: QuotaState) {
        self.state = state;
        self.last_fetched_at = Some(self.clock.now());
        self.generation += 1;
        self.pending_generation = None;
    }
}
