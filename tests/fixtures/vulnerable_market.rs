// Synthetic Anchor-style marketplace program used to exercise every
// detector category. Not a real program — only shaped to trip the
// lexical checks.

use anchor_lang::prelude::*;

#[program]
pub mod app_market {
    use super::*;

    pub fn set_admin(ctx: Context<SetAdmin>, new_admin: Pubkey) -> Result<()> {
        ctx.accounts.config.admin = new_admin;
        Ok(())
    }

    pub fn withdraw_all(ctx: Context<WithdrawAll>) -> Result<()> {
        transfer(ctx.accounts.vault.to_account_info(), ctx.accounts.recipient.to_account_info());
        Ok(())
    }

    pub fn place_bid(ctx: Context<PlaceBid>, amount: u64) -> Result<()> {
        let total = ctx.accounts.auction.highest_bid + amount;
        ctx.accounts.auction.highest_bid = total;
        Ok(())
    }

    pub fn create_listing(ctx: Context<CreateListing>, title: String, price: u64) -> Result<()> {
        ctx.accounts.listing.price = price;
        ctx.accounts.listing.title = title;
        Ok(())
    }

    pub fn settle(ctx: Context<Settle>) -> Result<()> {
        let share = ctx.accounts.listing.price / ctx.accounts.listing.fee_bps;
        ctx.accounts.listing.status = ListingStatus::Settled;
        Ok(())
    }
}

#[derive(Accounts)]
pub struct SetAdmin<'info> {
    #[account(mut)]
    pub config: Account<'info, MarketConfig>,
    pub admin: AccountInfo<'info>,
}

#[derive(Accounts)]
pub struct WithdrawAll<'info> {
    #[account(mut)]
    pub vault: AccountInfo<'info>,
    #[account(mut)]
    pub recipient: AccountInfo<'info>,
}

#[derive(Accounts)]
pub struct PlaceBid<'info> {
    #[account(mut)]
    pub auction: Account<'info, Auction>,
    pub bidder: Signer<'info>,
}

#[derive(Accounts)]
pub struct CreateListing<'info> {
    #[account(init, payer = seller, space = 200, seeds = [b"LST"], bump)]
    pub listing: Account<'info, Listing>,
    pub seller: Signer<'info>,
}

#[derive(Accounts)]
pub struct Settle<'info> {
    #[account(mut, close = buyer)]
    pub listing: Account<'info, Listing>,
    pub buyer: AccountInfo<'info>,
}

#[account]
pub struct MarketConfig {
    pub admin: Pubkey,
}

#[account]
pub struct Auction {
    pub highest_bid: u64,
}

#[account]
pub struct Listing {
    pub price: u64,
    pub fee_bps: u64,
    pub title: String,
    pub status: ListingStatus,
    pub bids: Vec<Pubkey>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub enum ListingStatus {
    Open,
    Settled,
}
