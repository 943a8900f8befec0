//! ABI surface of the position manager.

use alloy_sol_types::sol;

sol! {
    struct MintParams {
        address token0;
        address token1;
        uint24 fee;
        int24 tickLower;
        int24 tickUpper;
        uint256 amount0Desired;
        uint256 amount1Desired;
        uint256 amount0Min;
        uint256 amount1Min;
        address recipient;
        uint256 deadline;
    }

    struct IncreaseLiquidityParams {
        uint256 tokenId;
        uint256 amount0Desired;
        uint256 amount1Desired;
        uint256 amount0Min;
        uint256 amount1Min;
        uint256 deadline;
    }

    struct DecreaseLiquidityParams {
        uint256 tokenId;
        uint128 liquidity;
        uint256 amount0Min;
        uint256 amount1Min;
        uint256 deadline;
    }

    struct CollectParams {
        uint256 tokenId;
        address recipient;
        uint128 amount0Max;
        uint128 amount1Max;
    }

    /// What `collect` would pay out, raised by `collectAmounts`.
    error CollectAmounts(uint256 amount0, uint256 amount1);

    interface IPositionManager {
        function mint(MintParams params)
            external
            payable
            returns (uint256 tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);
        function increaseLiquidity(IncreaseLiquidityParams params)
            external
            payable
            returns (uint128 liquidity, uint256 amount0, uint256 amount1);
        function decreaseLiquidity(DecreaseLiquidityParams params)
            external
            payable
            returns (uint256 amount0, uint256 amount1);
        function collect(CollectParams params)
            external
            payable
            returns (uint256 amount0, uint256 amount1);
        function collectAmounts(CollectParams params)
            external
            returns (uint256 amount0, uint256 amount1);
        function burn(uint256 tokenId) external payable;

        function approve(address to, uint256 tokenId) external;
        function setApprovalForAll(address operator, bool approved) external;
        function getApproved(uint256 tokenId) external view returns (address operator);
        function ownerOf(uint256 tokenId) external view returns (address owner);
        function balanceOf(address owner) external view returns (uint256 balance);
        function positions(uint256 tokenId)
            external
            view
            returns (
                address operator,
                address token0,
                address token1,
                uint24 fee,
                int24 tickLower,
                int24 tickUpper,
                uint128 liquidity,
                uint128 tokensOwed0,
                uint128 tokensOwed1
            );

        function setEmergencyMode(bool engaged) external;
        function emergencyMode() external view returns (bool engaged);
    }

    /// Ownership transfers authorized by an access token.
    interface IGatedTransfers {
        function transferFrom(uint8 v, bytes32 r, bytes32 s, uint256 expiry, address from, address to, uint256 tokenId) external;
        function safeTransferFrom(uint8 v, bytes32 r, bytes32 s, uint256 expiry, address from, address to, uint256 tokenId) external;
    }

    /// Ownership transfers authorized by identity credentials.
    interface IVerifiedTransfers {
        function transferFrom(address from, address to, uint256 tokenId) external;
        function safeTransferFrom(address from, address to, uint256 tokenId) external;
    }
}
