//! Test fixtures for pharmacy-locator.
//!
//! Provides:
//! - Las Vegas pharmacy locations with a fixed user position
//! - Scripted stand-ins for the location, backend and routing services

#![allow(dead_code)]

pub mod las_vegas_pharmacies;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use pharmacy_locator::traits::{LocationSource, PharmacyDirectory, RouteProvider};
use pharmacy_locator::{Coordinate, LocatorError, MapViewModel, Pharmacy, Result};

pub use las_vegas_pharmacies::*;

/// One scripted reply.
pub enum Reply<T> {
    Ok(T),
    Err(fn() -> LocatorError),
    /// Never resolves.
    Hang,
}

/// A queue of replies handed out one per call, each after an optional delay.
pub struct Script<T> {
    replies: Mutex<VecDeque<(Duration, Reply<T>)>>,
}

impl<T> Script<T> {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }

    pub fn then(self, reply: Reply<T>) -> Self {
        self.then_after(Duration::ZERO, reply)
    }

    pub fn then_after(self, delay: Duration, reply: Reply<T>) -> Self {
        self.replies.lock().unwrap().push_back((delay, reply));
        self
    }

    async fn next(&self) -> Result<T> {
        let (delay, reply) = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected call: script exhausted");

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Reply::Ok(value) => Ok(value),
            Reply::Err(make) => Err(make()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub struct MockLocation {
    script: Script<Coordinate>,
}

impl MockLocation {
    pub fn new(script: Script<Coordinate>) -> Arc<Self> {
        Arc::new(Self { script })
    }

    pub fn at(coordinate: Coordinate) -> Arc<Self> {
        Self::new(Script::new().then(Reply::Ok(coordinate)))
    }
}

#[async_trait]
impl LocationSource for MockLocation {
    async fn request_current_location(&self) -> Result<Coordinate> {
        self.script.next().await
    }
}

pub struct MockDirectory {
    script: Script<Vec<Pharmacy>>,
    pub calls: Mutex<Vec<(Coordinate, String)>>,
}

impl MockDirectory {
    pub fn new(script: Script<Vec<Pharmacy>>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PharmacyDirectory for MockDirectory {
    async fn find_nearby(&self, origin: Coordinate, credential: &str) -> Result<Vec<Pharmacy>> {
        self.calls
            .lock()
            .unwrap()
            .push((origin, credential.to_string()));
        self.script.next().await
    }
}

pub struct MockRouter {
    script: Script<String>,
    pub calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl MockRouter {
    pub fn new(script: Script<String>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RouteProvider for MockRouter {
    async fn fetch_route(&self, origin: Coordinate, destination: Coordinate) -> Result<String> {
        self.calls.lock().unwrap().push((origin, destination));
        self.script.next().await
    }
}

pub type MockScreen = MapViewModel<Arc<MockLocation>, Arc<MockDirectory>, Arc<MockRouter>>;

pub fn screen(
    location: &Arc<MockLocation>,
    directory: &Arc<MockDirectory>,
    router: &Arc<MockRouter>,
) -> MockScreen {
    MapViewModel::new(location.clone(), directory.clone(), router.clone())
}
