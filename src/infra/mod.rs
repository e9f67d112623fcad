pub mod feed_client;
