//! Campaign funding ledger.
//!
//! A [`ledger::CampaignLedger`] owns every campaign: it assigns ids, accepts
//! donations from anyone, lets the creator withdraw once the deadline has
//! passed, and keeps an append-only expense trail. Caller identity, time and
//! the physical movement of funds are supplied from outside through
//! [`identity::Address`], [`clock::Clock`] and [`transfer::TransferChannel`].

pub mod campaign;
pub mod clock;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod transfer;
