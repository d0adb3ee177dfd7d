pub mod aggregator;
pub mod batch_scheduler;
pub mod outcome_writer;
pub mod prompt;
pub mod response_parser;
pub mod topic_planner;

pub use aggregator::{aggregate, AggregationMode};
pub use batch_scheduler::schedule;
pub use outcome_writer::OutcomeWriter;
pub use prompt::Prompt;
pub use response_parser::{parse_response, validate_record, ParsedBatch, RejectReason};
pub use topic_planner::{TopicPlan, TopicPlanner};
