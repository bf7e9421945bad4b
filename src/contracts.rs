//! Centralized Contract Definitions
//!
//! All Solidity contract interfaces for the oracle-guarded arbitrage bot,
//! defined using alloy's `sol!` macro.
//!
//! Each interface is annotated with `#[sol(rpc)]` to generate contract
//! instance types that can make RPC calls via any alloy Provider.
//!
//! Author: AI-Generated
//! Created: 2026-08-05

use alloy::sol;

// ── ERC20 ─────────────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

// ── SaucerSwap router (UniswapV2-style quoting) ──────────────────────

sol! {
    #[sol(rpc)]
    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
    }
}

// ── Pyth oracle (fee quoter) ─────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IPyth {
        function getUpdateFee(bytes[] calldata updateData) external view returns (uint256 feeAmount);
    }
}

// ── StrategyExecutor (guarded-swap executor contract) ────────────────

sol! {
    #[sol(rpc)]
    interface IStrategyExecutor {
        function executeSwapWithOracle(address router, address tokenIn, address tokenOut, uint256 amountIn, uint256 minAmountOut, address recipient, bytes[] calldata priceUpdateData, bytes32 priceId, uint64 maxAgeSec, int64 minPrice, int64 maxPrice) external payable returns (uint256 amountOut);
    }
}
