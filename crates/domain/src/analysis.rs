use std::fmt;

use chrono::{DateTime, Duration, Utc};
use derive_more::{Deref, Display};

use crate::{
    Clock, CreateError, DeleteError, ReadError, SystemClock, UnknownVariantError, UpdateError,
    clock,
};

#[allow(async_fn_in_trait)]
pub trait AnalysisService {
    async fn get_analyses(&self, page: u32, limit: u32) -> Result<AnalysisPage, ReadError>;
    async fn create_analysis(&self, analysis: NewAnalysis) -> Result<AiAnalysis, CreateError>;
    async fn delete_analysis(&self, id: AnalysisID) -> Result<AnalysisID, DeleteError>;
    async fn get_cached_analyses(&self) -> Result<Option<AnalysisRecord>, ReadError>;
    async fn set_cached_analyses(&self, record: &AnalysisRecord) -> Result<(), UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait AnalysisRepository {
    async fn read_analyses(&self, page: u32, limit: u32) -> Result<AnalysisPage, ReadError>;
    async fn create_analysis(&self, analysis: NewAnalysis) -> Result<AiAnalysis, CreateError>;
    async fn delete_analysis(&self, id: AnalysisID) -> Result<AnalysisID, DeleteError>;
    async fn read_cached_analyses(&self) -> Result<Option<AnalysisRecord>, ReadError>;
    async fn write_cached_analyses(&self, record: &AnalysisRecord) -> Result<(), UpdateError>;
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnalysisID(String);

impl From<String> for AnalysisID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AnalysisID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiAnalysis {
    pub id: AnalysisID,
    pub exercise: String,
    pub recorded_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub score: Score,
    pub verdict: String,
    pub status: AnalysisStatus,
    pub video_url: String,
    pub positives: Vec<String>,
    pub improvements: Vec<String>,
    pub ai_coach_tip: String,
    pub actions: AnalysisActions,
}

impl AiAnalysis {
    fn apply(&mut self, update: AnalysisUpdate) {
        if let Some(score) = update.score {
            self.score = score;
        }
        if let Some(verdict) = update.verdict {
            self.verdict = verdict;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(video_url) = update.video_url {
            self.video_url = video_url;
        }
        if let Some(positives) = update.positives {
            self.positives = positives;
        }
        if let Some(improvements) = update.improvements {
            self.improvements = improvements;
        }
        if let Some(ai_coach_tip) = update.ai_coach_tip {
            self.ai_coach_tip = ai_coach_tip;
        }
        if let Some(actions) = update.actions {
            self.actions = actions;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnalysis {
    pub exercise: String,
    pub recorded_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub score: Score,
    pub verdict: String,
    pub status: AnalysisStatus,
    pub video_url: String,
    pub positives: Vec<String>,
    pub improvements: Vec<String>,
    pub ai_coach_tip: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnalysisUpdate {
    pub score: Option<Score>,
    pub verdict: Option<String>,
    pub status: Option<AnalysisStatus>,
    pub video_url: Option<String>,
    pub positives: Option<Vec<String>>,
    pub improvements: Option<Vec<String>>,
    pub ai_coach_tip: Option<String>,
    pub actions: Option<AnalysisActions>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisActions {
    pub can_save: bool,
    pub can_delete: bool,
    pub is_current: bool,
}

/// Form score between 0 and 100.
#[derive(Deref, Display, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    pub fn new(value: u32) -> Result<Self, ScoreError> {
        match u8::try_from(value) {
            Ok(score) if score <= Self::MAX => Ok(Self(score)),
            _ => Err(ScoreError::OutOfRange(value)),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Score must be between 0 and 100 ({0} > 100)")]
    OutOfRange(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Good,
    Warning,
    Critical,
}

impl TryFrom<&str> for AnalysisStatus {
    type Error = UnknownVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "good" => Ok(AnalysisStatus::Good),
            "warning" => Ok(AnalysisStatus::Warning),
            "critical" => Ok(AnalysisStatus::Critical),
            _ => Err(UnknownVariantError::new("analysis status", value)),
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AnalysisStatus::Good => "good",
                AnalysisStatus::Warning => "warning",
                AnalysisStatus::Critical => "critical",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            total: 0,
            total_pages: 1,
        }
    }
}

impl Pagination {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPage {
    pub analyses: Vec<AiAnalysis>,
    pub pagination: Pagination,
}

/// Persisted form of an analysis store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnalysisRecord {
    pub analyses: Vec<AiAnalysis>,
    pub pagination: Pagination,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// Locally mirrored history of analyses, newest first.
#[derive(Debug)]
pub struct AnalysisStore<C: Clock = SystemClock> {
    analyses: Vec<AiAnalysis>,
    pagination: Pagination,
    last_fetched_at: Option<DateTime<Utc>>,
    clock: C,
}

impl AnalysisStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for AnalysisStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> AnalysisStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::restore(AnalysisRecord::default(), clock)
    }

    pub fn restore(record: AnalysisRecord, clock: C) -> Self {
        let mut store = Self {
            analyses: record.analyses,
            pagination: record.pagination,
            last_fetched_at: record.last_fetched_at,
            clock,
        };
        store.sort();
        store
    }

    #[must_use]
    pub fn record(&self) -> AnalysisRecord {
        AnalysisRecord {
            analyses: self.analyses.clone(),
            pagination: self.pagination,
            last_fetched_at: self.last_fetched_at,
        }
    }

    #[must_use]
    pub fn analyses(&self) -> &[AiAnalysis] {
        &self.analyses
    }

    #[must_use]
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    #[must_use]
    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetched_at
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pagination.has_more()
    }

    /// Replaces all analyses. Without pagination, the list is taken as complete.
    pub fn set_analyses(&mut self, analyses: Vec<AiAnalysis>, pagination: Option<Pagination>) {
        let total = u32::try_from(analyses.len()).unwrap_or(u32::MAX);
        self.analyses = analyses;
        self.sort();
        self.pagination = match pagination {
            Some(pagination) => Pagination {
                page: pagination.page.max(1),
                total_pages: pagination.total_pages.max(1),
                ..pagination
            },
            None => Pagination {
                total,
                ..Pagination::default()
            },
        };
        self.last_fetched_at = Some(self.clock.now());
    }

    /// Adds analyses of a further page. Analyses already present are kept.
    pub fn append_analyses(&mut self, analyses: Vec<AiAnalysis>, pagination: Pagination) {
        for analysis in analyses {
            if self.analyses.iter().all(|a| a.id != analysis.id) {
                self.analyses.push(analysis);
            }
        }
        self.sort();
        self.pagination = pagination;
    }

    pub fn apply_page(&mut self, page: AnalysisPage) {
        if page.pagination.page <= 1 {
            self.set_analyses(page.analyses, Some(page.pagination));
        } else {
            self.append_analyses(page.analyses, page.pagination);
        }
    }

    pub fn add_analysis(&mut self, analysis: AiAnalysis) {
        self.analyses.insert(0, analysis);
        self.pagination.total += 1;
    }

    pub fn remove_analysis(&mut self, id: &AnalysisID) -> Option<AiAnalysis> {
        let index = self.analyses.iter().position(|a| a.id == *id)?;
        self.pagination.total = self.pagination.total.saturating_sub(1);
        Some(self.analyses.remove(index))
    }

    /// Returns false if no analysis with the given id exists.
    pub fn update_analysis(&mut self, id: &AnalysisID, update: AnalysisUpdate) -> bool {
        match self.analyses.iter_mut().find(|a| a.id == *id) {
            Some(analysis) => {
                analysis.apply(update);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.analyses.clear();
        self.pagination = Pagination::default();
        self.last_fetched_at = None;
    }

    pub fn reset_pagination(&mut self) {
        self.pagination = Pagination {
            page: 1,
            total_pages: 1,
            ..self.pagination
        };
    }

    #[must_use]
    pub fn get(&self, id: &AnalysisID) -> Option<&AiAnalysis> {
        self.analyses.iter().find(|a| a.id == *id)
    }

    #[must_use]
    pub fn recent(&self, count: usize) -> &[AiAnalysis] {
        &self.analyses[..count.min(self.analyses.len())]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.pagination.total
    }

    /// Rounded mean score of the loaded analyses, 0 if there are none.
    #[must_use]
    pub fn average_score(&self) -> u8 {
        if self.analyses.is_empty() {
            return 0;
        }
        let len = self.analyses.len() as u64;
        let sum = self.analyses.iter().map(|a| u64::from(*a.score)).sum::<u64>();
        u8::try_from((2 * sum + len) / (2 * len)).unwrap_or(Score::MAX)
    }

    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        if self.has_more() {
            Some(self.pagination.page + 1)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_stale(&self, max_age: Duration) -> bool {
        clock::is_stale(self.last_fetched_at, self.clock.now(), max_age)
    }

    /// Loads the given page. The first page replaces the list, later pages are appended.
    pub async fn fetch_page(
        &mut self,
        service: &impl AnalysisService,
        page: u32,
        limit: u32,
    ) -> Result<(), ReadError> {
        let page = service.get_analyses(page, limit).await?;
        self.apply_page(page);
        Ok(())
    }

    /// Returns false if all pages have already been loaded.
    pub async fn load_more(&mut self, service: &impl AnalysisService) -> Result<bool, ReadError> {
        let Some(page) = self.next_page() else {
            return Ok(false);
        };
        self.fetch_page(service, page, self.pagination.limit).await?;
        Ok(true)
    }

    pub async fn refresh_if_stale(
        &mut self,
        service: &impl AnalysisService,
        max_age: Duration,
        limit: u32,
    ) -> Result<bool, ReadError> {
        if !self.is_stale(max_age) {
            return Ok(false);
        }
        self.fetch_page(service, 1, limit).await?;
        Ok(true)
    }

    pub async fn save_analysis(
        &mut self,
        service: &impl AnalysisService,
        analysis: NewAnalysis,
    ) -> Result<AiAnalysis, CreateError> {
        let analysis = service.create_analysis(analysis).await?;
        self.add_analysis(analysis.clone());
        Ok(analysis)
    }

    pub async fn delete_analysis(
        &mut self,
        service: &impl AnalysisService,
        id: AnalysisID,
    ) -> Result<(), DeleteError> {
        let id = service.delete_analysis(id).await?;
        self.remove_analysis(&id);
        Ok(())
    }

    pub async fn persist(&self, service: &impl AnalysisService) -> Result<(), UpdateError> {
        service.set_cached_analyses(&self.record()).await
    }

    pub async fn restore_from(
        service: &impl AnalysisService,
        clock: C,
    ) -> Result<Self, ReadError> {
        let record = service.get_cached_analyses().await?.unwrap_or_default();
        Ok(Self::restore(record, clock))
    }

    fn sort(&mut self) {
        self.analyses
            .sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    }
}
