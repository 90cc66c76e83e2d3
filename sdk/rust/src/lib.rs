//! Typed client for the subscription tracker API.

mod client;

pub use client::{
    ApiReply, CreateSubscription, Created, Envelope, SubscriptionRecord, SubscriptionsClient,
    SumQuery, Total, UpdateSubscription,
};
