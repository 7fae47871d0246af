pub use self::{
    block_header::BlockHeader,
    rpc_response::{RpcError, RpcRequest, RpcResponse},
    staking_info::StakingInfo,
};

mod block_header;
mod rpc_response;
mod staking_info;
