//! Integration tests for MCQ-Harvest
//!
//! `fetcher_tests` drive the HTTP fetcher against wiremock servers;
//! `crawl_tests` run whole crawls, over HTTP and over scripted fetchers.

mod crawl_tests;
