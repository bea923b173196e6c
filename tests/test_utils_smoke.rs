// (C) Copyright IBM Corp. 2024.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Exercises the `test_utils` feature's offline client constructor, for a
//! downstream crate's own test suite.

use rollout_evaluator::test_utils::offline_client;
use rollout_evaluator::{Attributes, DataType, Parameter};

#[test]
fn offline_client_is_usable_without_a_live_upstream() {
    let client = offline_client(
        vec![Parameter {
            name: "greeting".into(),
            data_type: DataType::String,
            default_value: "hi".into(),
            rules: Vec::new(),
        }],
        Vec::new(),
    );

    let value = client.evaluate_parameter("greeting", &Attributes::new());
    assert_eq!(value.as_string("fallback"), "hi");
    client.stop().unwrap();
}