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

use std::{env, error::Error, io::Write, thread, time::Duration};

use dotenvy::dotenv;
use rollout_evaluator::{Attributes, Client, ClientOptions};

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    let endpoint_url = env::var("ROLLOUT_ENDPOINT_URL").expect("ROLLOUT_ENDPOINT_URL should be set.");
    let service_name = env::var("ROLLOUT_SERVICE_NAME").unwrap_or_else(|_| "demo".to_string());
    let parameter_name = env::var("ROLLOUT_PARAMETER_NAME").expect("ROLLOUT_PARAMETER_NAME should be set.");

    let options = ClientOptions::builder(endpoint_url)
        .service_name(service_name)
        .build()?;
    let client = Client::new(options)?;

    print!("Waiting for initial data...");
    std::io::stdout().flush().unwrap();
    client.start()?;
    println!(" DONE");

    let mut attributes = Attributes::new();
    attributes.insert("city".to_string(), "Bangalore".into());
    attributes.insert("radius".to_string(), 60.0.into());

    println!("The information is displayed every 5 seconds.");
    println!("Try changing the configuration upstream and watch the value change.");

    loop {
        let value = client.evaluate_parameter(&parameter_name, &attributes);
        if value.has_error() {
            println!(
                "There was an error evaluating {parameter_name}: {}",
                value.error().map(|error| error.to_string()).unwrap_or_default()
            );
        } else {
            println!("{parameter_name} evaluated value is: {}", value.as_string("<non-string>"));
        }

        thread::sleep(Duration::from_secs(5));
    }
}
