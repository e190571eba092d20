//! Services - feed assembly, the follow graph and post operations,
//! written purely against the ports.

mod entries;
mod feed;
mod follow;
mod groups;
mod posts;

pub use entries::EntryLoader;
pub use feed::{FeedService, GroupFeed, HOME_CACHE_MAX_PAGE, HOME_CACHE_PREFIX, ProfileFeed};
pub use follow::FollowGraph;
pub use groups::GroupService;
pub use posts::{EditOutcome, PostDetail, PostService};
