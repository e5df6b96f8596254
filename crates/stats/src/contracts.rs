// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Contract interface for the lockdrop.

use alloy::sol;

sol! {
    #[sol(rpc, all_derives)]
    interface ILockdrop {
        /// `lockAddr` is the lock contract created for this deposit; `term` is the
        /// lock term enum (0 = 3 months, 1 = 6 months, 2 = 12 months).
        event Locked(
            address indexed owner,
            uint256 eth,
            address lockAddr,
            uint8 term,
            bytes edgewareAddr,
            bool isValidator,
            uint256 time
        );

        event Signaled(address indexed contractAddr, bytes edgewareAddr, uint256 time);

        function LOCK_START_TIME() external view returns (uint256);
    }
}
