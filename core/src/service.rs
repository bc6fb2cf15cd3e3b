//! The StudyStream service: every API operation as one synchronous call.
//!
//! RULES:
//!   - Each mutating operation runs in a single store transaction.
//!   - Every points change is paired with a ledger event.
//!   - Time is read only from the injected clock.

use chrono::Duration;
use rand::thread_rng;
use uuid::Uuid;

use crate::{
    account::{AuthSession, Registration, UserProfile, UserRecord},
    achievements::{reached_rules, Achievement},
    clock::{timestamp, Clock, SystemClock},
    config::StudyConfig,
    content::{recommend, ContentFilter, ContentItem},
    credentials::{
        hash_password, verify_password, Claims, TokenIssuer, DEFAULT_BCRYPT_COST,
        DEFAULT_TOKEN_TTL_HOURS,
    },
    error::{StudyError, StudyResult},
    event::{EventLogEntry, StudyEvent},
    fun_facts::FunFact,
    goals::{suggestions_for, Goal, GoalSuggestion, GoalType, GoalUpdate, NewGoal},
    leaderboard::{LeaderboardEntry, LeaderboardKind},
    progress::{
        completion_reward, next_streak, ProgressOutcome, ProgressRecord, ProgressSummary,
        ProgressUpdate,
    },
    store::StudyStore,
    types::Points,
};

pub struct ServiceOptions {
    pub token_secret:    Vec<u8>,
    pub token_ttl_hours: i64,
    pub bcrypt_cost:     u32,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            token_secret: b"studystream-dev-secret".to_vec(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

pub struct StudyService {
    store:       StudyStore,
    clock:       Box<dyn Clock>,
    tokens:      TokenIssuer,
    bcrypt_cost: u32,
    config:      StudyConfig,
}

impl StudyService {
    pub fn new(store: StudyStore, config: StudyConfig, options: ServiceOptions) -> Self {
        Self::with_clock(store, config, options, Box::new(SystemClock))
    }

    pub fn with_clock(
        store: StudyStore,
        config: StudyConfig,
        options: ServiceOptions,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            tokens: TokenIssuer::new(
                &options.token_secret,
                Duration::hours(options.token_ttl_hours),
            ),
            bcrypt_cost: options.bcrypt_cost,
            config,
        }
    }

    /// Build a migrated in-memory service with the builtin catalogs seeded.
    /// Used by tests across the workspace.
    pub fn build_test(clock: Box<dyn Clock>) -> StudyResult<Self> {
        let store = StudyStore::in_memory()?;
        store.migrate()?;
        let options = ServiceOptions {
            bcrypt_cost: 4,
            ..ServiceOptions::default()
        };
        let service = Self::with_clock(store, StudyConfig::builtin()?, options, clock);
        service.seed_catalog()?;
        Ok(service)
    }

    pub fn store(&self) -> &StudyStore {
        &self.store
    }

    /// Insert any catalog items not already stored.
    pub fn seed_catalog(&self) -> StudyResult<usize> {
        let now = timestamp(self.clock.now());
        let inserted = self
            .store
            .in_transaction(|s| s.seed_content(&self.config.content, &now))?;
        log::info!(
            "Seeded {inserted} new catalog items ({} total in catalog)",
            self.config.content.len()
        );
        Ok(inserted)
    }

    // ── Accounts ───────────────────────────────────────────────

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    pub fn register(&self, registration: Registration) -> StudyResult<AuthSession> {
        registration.validate()?;
        let password_hash = hash_password(&registration.password, self.bcrypt_cost)?;
        self.register_with_hash(registration, password_hash)
    }

    /// [`register`](Self::register) with the password already hashed, so the
    /// slow hashing step can run outside whatever guards the service.
    pub fn register_with_hash(
        &self,
        registration: Registration,
        password_hash: String,
    ) -> StudyResult<AuthSession> {
        registration.validate()?;
        let username = registration.username.trim().to_string();
        if self.store.username_exists(&username)? {
            return Err(StudyError::Conflict("Username already exists".into()));
        }

        let now = self.clock.now();
        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            grade_level: registration.grade_level.trim().to_string(),
            subjects: registration.normalized_subjects(),
            joined_date: timestamp(now),
            current_streak: 0,
            total_points: 0,
            last_active_date: None,
        };

        self.store.in_transaction(|s| {
            s.insert_user(&user)?;
            s.append_event(&EventLogEntry::new(
                &user.id,
                StudyEvent::UserRegistered { username: user.username.clone() },
                timestamp(now),
            ))
        })?;
        log::info!("Registered user {} ({})", user.username, user.id);

        self.start_session(&user)
    }

    pub fn login(&self, username: &str, password: &str) -> StudyResult<AuthSession> {
        let user = self.login_account(username, password)?;
        if !verify_password(password, &user.password_hash)? {
            log::debug!("Rejected password for {}", user.username);
            return Err(StudyError::InvalidCredentials);
        }
        self.start_session(&user)
    }

    /// First half of a login: input checks and account lookup. The caller
    /// verifies the password against the returned hash.
    pub fn login_account(&self, username: &str, password: &str) -> StudyResult<UserRecord> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(StudyError::validation("Username and password are required"));
        }
        self.store
            .user_by_username(username)?
            .ok_or(StudyError::InvalidCredentials)
    }

    /// Issue a token for an authenticated account.
    pub fn start_session(&self, user: &UserRecord) -> StudyResult<AuthSession> {
        Ok(AuthSession {
            token: self.tokens.issue(&user.id, &user.username, self.clock.now())?,
            user: UserProfile::from(user),
        })
    }

    pub fn authenticate(&self, token: &str) -> StudyResult<Claims> {
        self.tokens.verify(token, self.clock.now())
    }

    pub fn profile(&self, user_id: &str) -> StudyResult<UserProfile> {
        Ok(UserProfile::from(&self.require_user(user_id)?))
    }

    pub fn activity(&self, user_id: &str, limit: u32) -> StudyResult<Vec<EventLogEntry>> {
        self.require_user(user_id)?;
        self.store.events_for_user(user_id, limit)
    }

    // ── Content ────────────────────────────────────────────────

    pub fn list_content(&self, filter: &ContentFilter) -> StudyResult<Vec<ContentItem>> {
        self.store.list_content(filter)
    }

    pub fn content(&self, content_id: &str) -> StudyResult<ContentItem> {
        self.store
            .content_by_id(content_id)?
            .ok_or_else(|| StudyError::not_found("Content", content_id))
    }

    pub fn recommendations(&self, user_id: &str) -> StudyResult<Vec<ContentItem>> {
        let user = self.require_user(user_id)?;
        let candidates = self.store.content_for_subjects(&user.subjects)?;
        Ok(recommend(candidates, &user.subjects))
    }

    // ── Progress ───────────────────────────────────────────────

    /// Upsert progress, credit first-time completion and extend the streak.
    pub fn record_progress(
        &self,
        user_id: &str,
        update: ProgressUpdate,
    ) -> StudyResult<ProgressOutcome> {
        let user = self.require_user(user_id)?;
        self.content(&update.content_id)?;

        let now = self.clock.now();
        let at = timestamp(now);
        let today = self.clock.today();

        let outcome = self.store.in_transaction(|s| {
            let previous = s.progress_for(user_id, &update.content_id)?;
            let reward = completion_reward(previous.as_ref(), &update);
            let completed_at = update.completed.then(|| at.clone());

            let record = match &previous {
                Some(p) => ProgressRecord {
                    progress_percentage: update.progress_percentage,
                    completed: update.completed,
                    time_spent_minutes: update.time_spent_minutes,
                    completed_at,
                    updated_at: at.clone(),
                    rewarded: p.rewarded || reward > 0,
                    ..p.clone()
                },
                None => ProgressRecord {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    content_id: update.content_id.clone(),
                    progress_percentage: update.progress_percentage,
                    completed: update.completed,
                    time_spent_minutes: update.time_spent_minutes,
                    completed_at,
                    created_at: at.clone(),
                    updated_at: at.clone(),
                    rewarded: reward > 0,
                },
            };
            if previous.is_some() {
                s.update_progress(&record)?;
            } else {
                s.insert_progress(&record)?;
            }
            s.append_event(&EventLogEntry::new(
                user_id,
                StudyEvent::ProgressRecorded {
                    content_id: record.content_id.clone(),
                    progress_percentage: record.progress_percentage,
                    time_spent_minutes: record.time_spent_minutes,
                },
                at.clone(),
            ))?;

            if reward > 0 {
                s.append_event(&EventLogEntry::new(
                    user_id,
                    StudyEvent::ContentCompleted { content_id: record.content_id.clone() },
                    at.clone(),
                ))?;
                award_points(s, user_id, reward, "content_completed", &at)?;
            }

            let streak = next_streak(user.last_active_date, user.current_streak, today);
            if user.last_active_date != Some(today) || streak != user.current_streak {
                s.set_streak(user_id, streak, today)?;
                s.append_event(&EventLogEntry::new(
                    user_id,
                    StudyEvent::StreakUpdated { streak },
                    at.clone(),
                ))?;
            }

            Ok(ProgressOutcome {
                progress_id: record.id,
                progress_percentage: record.progress_percentage,
                completed: record.completed,
                points_awarded: reward,
                current_streak: streak,
                created: previous.is_none(),
            })
        })?;

        if outcome.points_awarded > 0 {
            log::info!(
                "User {user_id} completed {} (+{} points)",
                update.content_id,
                outcome.points_awarded
            );
        }
        Ok(outcome)
    }

    pub fn progress(&self, user_id: &str) -> StudyResult<Vec<ProgressSummary>> {
        self.require_user(user_id)?;
        self.store.progress_for_user(user_id)
    }

    // ── Goals ──────────────────────────────────────────────────

    pub fn goals(&self, user_id: &str, goal_type: Option<GoalType>) -> StudyResult<Vec<Goal>> {
        self.store.goals_for_user(user_id, goal_type)
    }

    pub fn goal(&self, goal_id: &str) -> StudyResult<Goal> {
        self.store
            .goal_by_id(goal_id)?
            .ok_or_else(|| StudyError::not_found("Goal", goal_id))
    }

    pub fn create_goal(&self, new: NewGoal) -> StudyResult<Goal> {
        self.require_user(&new.user_id)?;
        let at = timestamp(self.clock.now());
        let goal = Goal {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            target_value: new.target_value,
            current_value: 0,
            completed: false,
            goal_type: new.goal_type,
            created_at: at.clone(),
            updated_at: at.clone(),
            rewarded: false,
        };
        self.store.in_transaction(|s| {
            s.insert_goal(&goal)?;
            s.append_event(&EventLogEntry::new(
                &goal.user_id,
                StudyEvent::GoalCreated { goal_id: goal.id.clone(), title: goal.title.clone() },
                at.clone(),
            ))
        })?;
        Ok(goal)
    }

    /// Completion points are paid once per goal, however often it is
    /// marked completed again.
    pub fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> StudyResult<Goal> {
        let at = timestamp(self.clock.now());
        self.store.in_transaction(|s| {
            let goal = s
                .goal_by_id(goal_id)?
                .ok_or_else(|| StudyError::not_found("Goal", goal_id))?;
            let reward = update.reward(&goal);
            s.update_goal_progress(
                goal_id,
                update.current_value,
                update.completed,
                reward > 0,
                &at,
            )?;

            if reward > 0 {
                s.append_event(&EventLogEntry::new(
                    &goal.user_id,
                    StudyEvent::GoalCompleted { goal_id: goal.id.clone() },
                    at.clone(),
                ))?;
                award_points(s, &goal.user_id, reward, "goal_completed", &at)?;
            }
            Ok(Goal {
                current_value: update.current_value,
                completed: update.completed,
                updated_at: at.clone(),
                rewarded: goal.rewarded || reward > 0,
                ..goal
            })
        })
    }

    pub fn delete_goal(&self, goal_id: &str) -> StudyResult<()> {
        let at = timestamp(self.clock.now());
        self.store.in_transaction(|s| {
            let goal = s
                .goal_by_id(goal_id)?
                .ok_or_else(|| StudyError::not_found("Goal", goal_id))?;
            s.delete_goal(goal_id)?;
            s.append_event(&EventLogEntry::new(
                &goal.user_id,
                StudyEvent::GoalDeleted { goal_id: goal.id },
                at,
            ))
        })
    }

    pub fn goal_suggestions(&self, user_id: &str) -> StudyResult<Vec<GoalSuggestion>> {
        Ok(suggestions_for(&self.require_user(user_id)?.subjects))
    }

    // ── Achievements ───────────────────────────────────────────

    pub fn achievements(&self, user_id: &str) -> StudyResult<Vec<Achievement>> {
        self.store.achievements_for_user(user_id)
    }

    /// Evaluate every threshold rule once and award what is newly reached.
    /// Returns only the achievements written by this call.
    pub fn check_achievements(&self, user_id: &str) -> StudyResult<Vec<Achievement>> {
        let at = timestamp(self.clock.now());
        let awarded = self.store.in_transaction(|s| {
            let stats = s
                .learner_stats(user_id)?
                .ok_or_else(|| StudyError::not_found("User", user_id))?;

            let mut awarded = Vec::new();
            for rule in reached_rules(stats) {
                let achievement = Achievement {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    achievement_type: rule.achievement_type.to_string(),
                    title: rule.title.to_string(),
                    description: rule.description.to_string(),
                    points_awarded: rule.points,
                    earned_at: at.clone(),
                };
                if !s.insert_achievement_if_absent(&achievement)? {
                    continue;
                }
                s.append_event(&EventLogEntry::new(
                    user_id,
                    StudyEvent::AchievementEarned {
                        achievement_type: achievement.achievement_type.clone(),
                        title: achievement.title.clone(),
                        points: rule.points,
                    },
                    at.clone(),
                ))?;
                if rule.points > 0 {
                    award_points(s, user_id, rule.points, rule.achievement_type, &at)?;
                }
                awarded.push(achievement);
            }
            Ok(awarded)
        })?;

        for a in &awarded {
            log::info!("Achievement awarded: {} to user {user_id}", a.title);
        }
        Ok(awarded)
    }

    pub fn leaderboard(
        &self,
        kind: LeaderboardKind,
        limit: u32,
    ) -> StudyResult<Vec<LeaderboardEntry>> {
        self.store.leaderboard(kind, limit)
    }

    // ── Fun facts ──────────────────────────────────────────────

    pub fn mascot_fact(&self) -> Option<FunFact> {
        self.config.fun_facts.random_mascot(&mut thread_rng()).cloned()
    }

    pub fn subject_fact(&self, subject: &str) -> Option<FunFact> {
        self.config
            .fun_facts
            .random_for_subject(subject, &mut thread_rng())
            .cloned()
    }

    fn require_user(&self, user_id: &str) -> StudyResult<UserRecord> {
        self.store
            .user_by_id(user_id)?
            .ok_or_else(|| StudyError::not_found("User", user_id))
    }
}

/// Credit points and record why. Call inside a transaction.
fn award_points(
    store: &StudyStore,
    user_id: &str,
    points: Points,
    reason: &str,
    at: &str,
) -> StudyResult<()> {
    store.add_points(user_id, points)?;
    store.append_event(&EventLogEntry::new(
        user_id,
        StudyEvent::PointsAwarded { points, reason: reason.to_string() },
        at.to_string(),
    ))?;
    log::debug!("Awarded {points} points to {user_id} for {reason}");
    Ok(())
}
