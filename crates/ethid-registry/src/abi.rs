//! ERC-1056 Ethereum DID registry interface.
//!
//! Only the surface this stack touches: the three mutating operations, the
//! per-identity change pointer, and the two change events the resolver folds.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    contract EthereumDIDRegistry {
        function changed(address identity) public view returns (uint256);

        function setAttribute(address identity, bytes32 name, bytes value, uint256 validity) public;
        function addDelegate(address identity, bytes32 delegateType, address delegate, uint256 validity) public;
        function revokeDelegate(address identity, bytes32 delegateType, address delegate) public;

        event DIDAttributeChanged(
            address indexed identity,
            bytes32 name,
            bytes value,
            uint256 validTo,
            uint256 previousChange
        );

        event DIDDelegateChanged(
            address indexed identity,
            bytes32 delegateType,
            address delegate,
            uint256 validTo,
            uint256 previousChange
        );
    }
}
