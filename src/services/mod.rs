pub mod output_poller;
pub mod phantombuster_client;
pub mod profile_search;


pub use output_poller::*;
pub use phantombuster_client::*;
pub use profile_search::*;
