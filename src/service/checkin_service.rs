//! Check-in service: status toggles and scannable tokens.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::qr_encoder::{self, QrImage};
use crate::domain::{CheckInToken, Player, PlayerId};
use crate::error::BookingError;
use crate::persistence::BookingStore;

/// A player with everything needed to print their badge.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerCard {
    /// The player.
    pub player: Player,
    /// Token encoded in the QR image.
    pub token: CheckInToken,
    /// Rendered QR image.
    pub qr: QrImage,
}

/// Drives the player check-in state machine.
#[derive(Debug, Clone)]
pub struct CheckInService {
    store: Arc<dyn BookingStore>,
    public_base_url: String,
}

impl CheckInService {
    /// Creates a new `CheckInService` minting tokens under
    /// `public_base_url`.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into(),
        }
    }

    /// Flips a player between `in` and `out`.
    ///
    /// Applied atomically by the store, so two concurrent toggles always
    /// land back on the starting status.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::PlayerNotFound`] for an unknown player.
    pub async fn toggle(&self, player_id: PlayerId) -> Result<Player, BookingError> {
        let player = self.store.toggle_player(player_id).await?;
        tracing::info!(%player_id, booking_id = %player.booking_id, status = %player.status, "check-in toggled");
        Ok(player)
    }

    /// The token for `player_id`. Independent of the player's status.
    #[must_use]
    pub fn mint_token(&self, player_id: PlayerId) -> CheckInToken {
        CheckInToken::mint(player_id, &self.public_base_url)
    }

    /// Loads a player and renders their QR badge.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::PlayerNotFound`] for an unknown player.
    pub async fn player_card(&self, player_id: PlayerId) -> Result<PlayerCard, BookingError> {
        let player = self.store.get_player(player_id).await?;
        let token = self.mint_token(player.id);
        let qr = qr_encoder::render_inline(token.payload())?;
        Ok(PlayerCard { player, token, qr })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{
        BookingId, CheckInStatus, NewBooking, NewPlayer, NewSport, TimeWindow, UserId,
    };
    use crate::persistence::MemoryStore;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;

    fn t(h: u32) -> NaiveTime {
        let Some(time) = NaiveTime::from_hms_opt(h, 0, 0) else {
            panic!("valid time");
        };
        time
    }

    async fn setup() -> (Arc<MemoryStore>, CheckInService, BookingId) {
        let store = Arc::new(MemoryStore::new());
        let Ok(sport) = store
            .insert_sport(NewSport {
                name: "Squash".to_string(),
                description: String::new(),
                price_per_hour: Decimal::new(4000, 2),
                available_from: t(8),
                available_to: t(20),
            })
            .await
        else {
            panic!("sport insert failed");
        };
        let (Ok(window), Some(date)) = (
            TimeWindow::new(t(9), t(10)),
            NaiveDate::from_ymd_opt(2024, 3, 1),
        ) else {
            panic!("valid window");
        };
        let Ok(total_price) = window.price_at(sport.price_per_hour) else {
            panic!("price in range");
        };
        let Ok(booking) = store
            .reserve(NewBooking {
                sport_id: sport.id,
                owner_id: UserId::new(),
                date,
                window,
                total_price,
            })
            .await
        else {
            panic!("reserve failed");
        };
        let service = CheckInService::new(
            Arc::clone(&store) as Arc<dyn BookingStore>,
            "https://courts.example.com/",
        );
        (store, service, booking.id)
    }

    async fn add_player(store: &MemoryStore, booking_id: BookingId) -> Player {
        let Ok(player) = store
            .insert_player(NewPlayer {
                booking_id,
                user_id: None,
                name: "Robin".to_string(),
                email: "robin@example.com".to_string(),
            })
            .await
        else {
            panic!("player insert failed");
        };
        player
    }

    #[tokio::test]
    async fn toggle_flips_and_returns_status() {
        let (store, service, booking_id) = setup().await;
        let player = add_player(&store, booking_id).await;
        assert_eq!(player.status, CheckInStatus::Out);

        let Ok(once) = service.toggle(player.id).await else {
            panic!("toggle failed");
        };
        assert_eq!(once.status, CheckInStatus::In);

        let Ok(twice) = service.toggle(player.id).await else {
            panic!("toggle failed");
        };
        assert_eq!(twice.status, CheckInStatus::Out);
    }

    #[tokio::test]
    async fn toggle_unknown_player_leaves_state_alone() {
        let (store, service, booking_id) = setup().await;
        let player = add_player(&store, booking_id).await;

        let result = service.toggle(PlayerId::new()).await;
        assert!(matches!(result, Err(BookingError::PlayerNotFound(_))));

        let Ok(stored) = store.get_player(player.id).await else {
            panic!("player missing");
        };
        assert_eq!(stored.status, CheckInStatus::Out);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_toggles_cancel_out() {
        let (store, service, booking_id) = setup().await;
        let player = add_player(&store, booking_id).await;
        let service = Arc::new(service);

        let a = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.toggle(player.id).await }
        });
        let b = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.toggle(player.id).await }
        });
        let (Ok(Ok(_)), Ok(Ok(_))) = (a.await, b.await) else {
            panic!("toggles failed");
        };

        let Ok(stored) = store.get_player(player.id).await else {
            panic!("player missing");
        };
        assert_eq!(stored.status, CheckInStatus::Out);
    }

    #[tokio::test]
    async fn token_survives_toggles() {
        let (store, service, booking_id) = setup().await;
        let player = add_player(&store, booking_id).await;

        let Ok(before) = service.player_card(player.id).await else {
            panic!("card failed");
        };
        assert!(service.toggle(player.id).await.is_ok());
        let Ok(after) = service.player_card(player.id).await else {
            panic!("card failed");
        };

        assert_eq!(before.token, after.token);
        assert_eq!(before.qr, after.qr);
        assert_eq!(after.player.status, CheckInStatus::In);
        assert_eq!(
            before.token.payload(),
            format!("https://courts.example.com/checkin/{}", player.id)
        );
    }

    #[tokio::test]
    async fn card_for_unknown_player_is_not_found() {
        let (_, service, _) = setup().await;
        let result = service.player_card(PlayerId::new()).await;
        assert!(matches!(result, Err(BookingError::PlayerNotFound(_))));
    }
}
