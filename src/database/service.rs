//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{
    AttendeeRepository, BoothRepository, DatabasePool, ExhibitorRepository, ExpoRepository,
    FeedbackRepository, SessionRepository,
};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub expos: ExpoRepository,
    pub booths: BoothRepository,
    pub exhibitors: ExhibitorRepository,
    pub attendees: AttendeeRepository,
    pub sessions: SessionRepository,
    pub feedback: FeedbackRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            expos: ExpoRepository::new(pool.clone()),
            booths: BoothRepository::new(pool.clone()),
            exhibitors: ExhibitorRepository::new(pool.clone()),
            attendees: AttendeeRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            feedback: FeedbackRepository::new(pool),
        }
    }
}
