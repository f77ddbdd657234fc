//! Services module
//!
//! This module contains the engine's business logic services.

pub mod group;
pub mod lookup;
pub mod message;
pub mod notification;
pub mod poll;
pub mod ranking;
pub mod vote;

// Re-export commonly used services
pub use group::GroupService;
pub use lookup::{HttpLookupProvider, LookupProvider};
pub use message::MessageService;
pub use notification::NotificationService;
pub use poll::PollService;
pub use ranking::{ranker_from_settings, LlmRanker, NoopRanker, Ranker};
pub use vote::VoteService;

use std::sync::Arc;

use crate::config::Settings;
use crate::database::Store;
use crate::realtime::RealtimeChannel;

/// Service factory wiring every service to the shared gateway and channel
#[derive(Clone)]
pub struct ServiceFactory {
    pub group_service: GroupService,
    pub message_service: MessageService,
    pub poll_service: PollService,
    pub vote_service: VoteService,
    pub notification_service: NotificationService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        store: Arc<dyn Store>,
        realtime: Arc<RealtimeChannel>,
        settings: &Settings,
    ) -> Self {
        let group_service = GroupService::new(Arc::clone(&store));
        let message_service = MessageService::new(
            Arc::clone(&store),
            Arc::clone(&realtime),
            settings.planbot.display_name.clone(),
        );
        let poll_service = PollService::new(Arc::clone(&store), Arc::clone(&realtime));
        let vote_service = VoteService::new(Arc::clone(&store), Arc::clone(&realtime));
        let notification_service = NotificationService::new(store);

        Self {
            group_service,
            message_service,
            poll_service,
            vote_service,
            notification_service,
        }
    }
}
