//! SeaORM entity models
//!
//! Database entities for Newsroom

pub mod newspaper;
pub mod newspaper_publisher;
pub mod redactor;
pub mod topic;

pub use topic::{
    Entity as TopicEntity,
    Model as Topic,
    ActiveModel as TopicActiveModel,
    Column as TopicColumn,
};

pub use redactor::{
    Entity as RedactorEntity,
    Model as Redactor,
    ActiveModel as RedactorActiveModel,
    Column as RedactorColumn,
};

pub use newspaper::{
    Entity as NewspaperEntity,
    Model as Newspaper,
    ActiveModel as NewspaperActiveModel,
    Column as NewspaperColumn,
};

pub use newspaper_publisher::{
    Entity as NewspaperPublisherEntity,
    Model as NewspaperPublisher,
    ActiveModel as NewspaperPublisherActiveModel,
    Column as NewspaperPublisherColumn,
};
