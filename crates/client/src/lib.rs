//! Composition root for the swapline targeting core.
//!
//! [`TargetingClient`] owns one instance of every component (classifier,
//! resilience manager, cache, notification center, targeting store and
//! coordinator) wired from a [`SwaplineConfig`]. Hosts supply the transport
//! as a [`RemoteInvoker`] and feed connection failures into
//! [`TargetingClient::resilience`].

use std::path::Path;
use std::sync::Arc;

use swapline_auth::ErrorClassifier;
use swapline_cache::{InvalidationReason, ProposalCache};
use swapline_notify::{DeliveryCascade, NotificationCenter, NotificationSink};
use swapline_primitives::UserId;
use swapline_resilience::{ConnectionResilienceManager, ConnectionSignal};
use swapline_targeting::{InMemoryTargetingStore, NullSessionGuard, RemoteInvoker, SessionGuard, TargetingCoordinator, TargetingStore};
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

pub mod telemetry;

pub use swapline_config::{ConfigError, SwaplineConfig};

#[derive(Debug, Error)]
pub enum ClientError {
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Fully wired targeting core for one signed-in user.
pub struct TargetingClient {
	config: SwaplineConfig,
	classifier: ErrorClassifier,
	resilience: Arc<ConnectionResilienceManager>,
	cache: ProposalCache,
	notifications: Arc<NotificationCenter>,
	store: Arc<dyn TargetingStore>,
	coordinator: Arc<TargetingCoordinator>,
}

impl TargetingClient {
	pub fn builder(remote: Arc<dyn RemoteInvoker>) -> TargetingClientBuilder {
		TargetingClientBuilder {
			remote,
			config: SwaplineConfig::default(),
			store: None,
			session: None,
			user_id: None,
			modal: None,
			banner: None,
			toast: None,
		}
	}

	/// Builds a client from a TOML file; a missing file means defaults.
	pub fn load(path: &Path, remote: Arc<dyn RemoteInvoker>) -> Result<Self, ClientError> {
		let config = SwaplineConfig::load_or_default(path)?;
		Ok(Self::builder(remote).config(config).build())
	}

	pub fn config(&self) -> &SwaplineConfig {
		&self.config
	}

	pub fn classifier(&self) -> &ErrorClassifier {
		&self.classifier
	}

	pub fn resilience(&self) -> &Arc<ConnectionResilienceManager> {
		&self.resilience
	}

	pub fn cache(&self) -> &ProposalCache {
		&self.cache
	}

	pub fn notifications(&self) -> &Arc<NotificationCenter> {
		&self.notifications
	}

	pub fn store(&self) -> &Arc<dyn TargetingStore> {
		&self.store
	}

	pub fn coordinator(&self) -> &Arc<TargetingCoordinator> {
		&self.coordinator
	}

	/// Reacts to a connection signal on the client side.
	///
	/// A fresh connection or a page refresh means pushed updates may have been
	/// missed, so cached reads are dropped.
	pub fn apply_signal(&self, signal: &ConnectionSignal) {
		match signal {
			ConnectionSignal::RetryConnection | ConnectionSignal::RefreshPage => {
				let removed = self.cache.clear(InvalidationReason::ManualRefresh);
				tracing::debug!(?signal, removed, "client.cache_cleared");
			}
			ConnectionSignal::StopReconnection { reason } => {
				tracing::warn!(reason = reason.as_str(), "client.realtime_stopped");
			}
			_ => {}
		}
	}

	/// Spawns a task applying every broadcast [`ConnectionSignal`] until the
	/// client is dropped. Must be called within a tokio runtime.
	pub fn spawn_signal_listener(self: &Arc<Self>) -> JoinHandle<()> {
		let client = Arc::downgrade(self);
		let mut signals = self.resilience.subscribe();
		tokio::spawn(async move {
			loop {
				let received = signals.recv().await;
				let Some(client) = client.upgrade() else { break };
				match received {
					Ok(signal) => client.apply_signal(&signal),
					Err(RecvError::Lagged(skipped)) => {
						tracing::warn!(skipped, "client.signals_lagged");
						client.cache.clear(InvalidationReason::ManualRefresh);
					}
					Err(RecvError::Closed) => break,
				}
			}
		})
	}
}

pub struct TargetingClientBuilder {
	remote: Arc<dyn RemoteInvoker>,
	config: SwaplineConfig,
	store: Option<Arc<dyn TargetingStore>>,
	session: Option<Arc<dyn SessionGuard>>,
	user_id: Option<UserId>,
	modal: Option<Arc<dyn NotificationSink>>,
	banner: Option<Arc<dyn NotificationSink>>,
	toast: Option<Arc<dyn NotificationSink>>,
}

impl TargetingClientBuilder {
	#[must_use]
	pub fn config(mut self, config: SwaplineConfig) -> Self {
		self.config = config;
		self
	}

	#[must_use]
	pub fn store(mut self, store: Arc<dyn TargetingStore>) -> Self {
		self.store = Some(store);
		self
	}

	#[must_use]
	pub fn session(mut self, session: Arc<dyn SessionGuard>) -> Self {
		self.session = Some(session);
		self
	}

	#[must_use]
	pub fn user(mut self, user_id: UserId) -> Self {
		self.user_id = Some(user_id);
		self
	}

	/// Mounts the modal surface for permanent-failure alerts.
	#[must_use]
	pub fn modal(mut self, sink: Arc<dyn NotificationSink>) -> Self {
		self.modal = Some(sink);
		self
	}

	#[must_use]
	pub fn banner(mut self, sink: Arc<dyn NotificationSink>) -> Self {
		self.banner = Some(sink);
		self
	}

	/// Toast surface; defaults to the client's [`NotificationCenter`].
	#[must_use]
	pub fn toast(mut self, sink: Arc<dyn NotificationSink>) -> Self {
		self.toast = Some(sink);
		self
	}

	pub fn build(self) -> TargetingClient {
		let notifications = Arc::new(NotificationCenter::new());
		let toast = self.toast.unwrap_or_else(|| notifications.clone() as Arc<dyn NotificationSink>);
		let cascade = DeliveryCascade::standard(self.modal, self.banner, Some(toast));
		let classifier = ErrorClassifier::new(self.config.classifier_config());
		let resilience = Arc::new(ConnectionResilienceManager::new(self.config.resilience_config(), cascade));
		let cache = ProposalCache::new(self.config.cache_config());
		let store = self
			.store
			.unwrap_or_else(|| Arc::new(InMemoryTargetingStore::new()) as Arc<dyn TargetingStore>);
		let session = self.session.unwrap_or_else(|| Arc::new(NullSessionGuard) as Arc<dyn SessionGuard>);

		let mut coordinator = TargetingCoordinator::builder(Arc::clone(&store), self.remote)
			.config(self.config.coordinator_config())
			.classifier(classifier.clone())
			.cache(cache.clone())
			.resilience(Arc::clone(&resilience))
			.notifications(notifications.clone())
			.session(session);
		if let Some(user_id) = self.user_id {
			coordinator = coordinator.user(user_id);
		}

		tracing::debug!(
			optimistic = self.config.coordinator.optimistic_updates,
			max_retries = self.config.coordinator.max_retries,
			"client.built"
		);

		TargetingClient {
			config: self.config,
			classifier,
			resilience,
			cache,
			notifications,
			store,
			coordinator: Arc::new(coordinator.build()),
		}
	}
}
