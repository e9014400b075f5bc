// ABOUTME: Test support utilities.
// ABOUTME: Fake zkApp CLI and keygen scripts, account inventories and tracing setup.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Duration;

use zkapp_harness::chain::{ChainPoller, Endpoint};
use zkapp_harness::deploy::{DeployContext, DeploySettings};
use zkapp_harness::keys::CommandKeyGenerator;
use zkapp_harness::pool::{Account, AccountInventory, AccountPool};
use zkapp_harness::project::CliProjectGenerator;
use zkapp_harness::types::KeyPair;

static TRACING_INIT: Once = Once::new();

/// Transaction hash printed by the fake `zk deploy`.
#[allow(dead_code)]
pub const TX_HASH: &str = "5JuSGvgJ4Nrk5gCmqPhnbnVLwTNvoZeTkMpfNJwdUHJKSgpCEDyY";

/// Public key printed by the fake keygen.
#[allow(dead_code)]
pub const ZKAPP_PUBLIC_KEY: &str = "B62qzkappFakePublicKey";

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("zkapp_harness=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Write an executable shell script into `dir`.
#[allow(dead_code)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Behaviour of the fake `zk deploy`.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployBehavior {
    /// Prints the success marker and the transaction URL.
    Succeed,
    /// Exits 1 after a compile error.
    Fail,
    /// Succeeds but prints no transaction hash.
    NoHash,
    /// Sends the transaction even when the answer is `no`.
    IgnoreAnswer,
    /// Never finishes.
    Hang,
    /// Sends the transaction without ever asking for confirmation.
    SkipConfirmation,
}

/// A fake `zk` CLI supporting `project` and `deploy`.
///
/// `deploy` refuses to run unless the alias, the zkApp key and a fee payer
/// key in `key_cache` exist, mirroring what the real CLI reads.
#[allow(dead_code)]
pub fn fake_zk(dir: &Path, key_cache: &Path, behavior: DeployBehavior) -> PathBuf {
    let deploy_tail = match behavior {
        DeployBehavior::Succeed
        | DeployBehavior::IgnoreAnswer
        | DeployBehavior::SkipConfirmation => format!(
            r#"echo "Success! Deploy transaction sent."
echo ""
echo "Next step:"
echo "  Your smart contract will be live (or updated)"
echo "  as soon as the transaction is included in a block:"
echo "  https://minascan.io/devnet/tx/{hash}"
"#,
            hash = TX_HASH
        ),
        DeployBehavior::Fail => {
            "echo \"error TS2304: Cannot find name 'Field'.\" >&2\nexit 1\n".to_string()
        }
        DeployBehavior::NoHash => {
            "echo \"Success! Deploy transaction sent.\"\necho \"Next step:\"\necho \"done\"\n"
                .to_string()
        }
        DeployBehavior::Hang => "exec sleep 30\n".to_string(),
    };
    let honour_no = if behavior == DeployBehavior::IgnoreAnswer {
        ""
    } else {
        "    if [ \"$answer\" != \"yes\" ]; then\n      echo \"Aborted. Transaction not sent.\"\n      exit 0\n    fi\n"
    };
    let confirm = if behavior == DeployBehavior::SkipConfirmation {
        String::new()
    } else {
        format!(
            "    if [ \"$1\" != \"-y\" ]; then\n      printf 'Are you sure you want to send (yes/no)? '\n      read -r answer\n{}    fi\n",
            honour_no
        )
    };

    let body = format!(
        r#"cmd="$1"
shift
case "$cmd" in
  project)
    name="$1"
    shift
    ui=""
    if [ "$1" = "--ui" ]; then
      ui="$2"
    fi
    if [ -z "$ui" ]; then
      printf 'Create an accompanying UI project too? '
      read -r selection
      downs=$(printf '%s' "$selection" | grep -o '\[B' | wc -l | tr -d ' ')
      case "$downs" in
        0) ui=svelte ;;
        1) ui=next ;;
        2) ui=nuxt ;;
        3) ui=empty ;;
        *) ui=none ;;
      esac
      if [ "$ui" = "next" ]; then
        printf 'Do you want to set up your project for deployment to GitHub Pages? '
        read -r pages
      fi
    fi
    if [ "$ui" = "none" ]; then
      mkdir -p "$name"
      echo '{{"name":"contracts"}}' > "$name/package.json"
    else
      mkdir -p "$name/contracts" "$name/ui"
      echo '{{"name":"contracts"}}' > "$name/contracts/package.json"
      echo "$ui" > "$name/ui/variant"
    fi
    echo "Success!"
    echo ""
    echo "Next steps:"
    echo "  cd $name"
    ;;
  deploy)
    alias="$1"
    shift
    grep -q "\"$alias\"" config.json || {{ echo "alias $alias not found" >&2; exit 1; }}
    [ -f "keys/$alias.json" ] || {{ echo "missing zkApp key" >&2; exit 1; }}
    ls "{cache}"/*.json > /dev/null 2>&1 || {{ echo "missing fee payer key" >&2; exit 1; }}
{confirm}    {deploy_tail}
    ;;
  *)
    echo "unknown command $cmd" >&2
    exit 2
    ;;
esac
"#,
        cache = key_cache.display(),
    );
    write_script(dir, "zk", &body)
}

/// A keygen printing a fixed key pair as JSON.
#[allow(dead_code)]
pub fn fake_keygen(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "keygen",
        &format!(
            "echo 'generating...'\necho '{{\"publicKey\":\"{}\",\"privateKey\":\"EKEzkappFake\"}}'\n",
            ZKAPP_PUBLIC_KEY
        ),
    )
}

/// Pool of `size` fee payers named `B62qpayer<i>`.
#[allow(dead_code)]
pub fn pool(size: usize, acquire_timeout: Duration) -> AccountPool {
    let accounts = (0..size)
        .map(|i| Account::new(KeyPair::new(format!("B62qpayer{}", i), format!("EKEpayer{}", i))))
        .collect();
    AccountPool::with_acquire_timeout(AccountInventory::new(accounts).unwrap(), acquire_timeout)
}

/// Write a JSON inventory of `size` accounts and return its path.
#[allow(dead_code)]
pub fn write_inventory(dir: &Path, size: usize) -> PathBuf {
    let accounts: Vec<_> = (0..size)
        .map(|i| {
            serde_json::json!({
                "publicKey": format!("B62qpayer{}", i),
                "privateKey": format!("EKEpayer{}", i),
            })
        })
        .collect();
    let path = dir.join("accounts.json");
    fs::write(&path, serde_json::to_string_pretty(&accounts).unwrap()).unwrap();
    path
}

/// Scratch directories and fakes for one deployment test.
#[allow(dead_code)]
pub struct Harness {
    pub dir: tempfile::TempDir,
    pub zk: PathBuf,
    pub keygen: PathBuf,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(behavior: DeployBehavior) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        let zk = fake_zk(&bin, &dir.path().join("cache"), behavior);
        let keygen = fake_keygen(&bin);
        Self { dir, zk, keygen }
    }

    pub fn workspace(&self) -> PathBuf {
        self.dir.path().join("projects")
    }

    pub fn key_cache(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    pub fn settings(&self, endpoint: Endpoint) -> DeploySettings {
        DeploySettings {
            cli: self.zk.display().to_string(),
            workspace: self.workspace(),
            key_cache_dir: self.key_cache(),
            endpoint,
            network_id: "testnet".to_string(),
            fee: "0.1".to_string(),
            poll_interval: Duration::from_millis(20),
            max_wait: Duration::from_secs(2),
            deploy_timeout: Duration::from_secs(20),
            keep_projects: false,
            attempt_timeout: None,
        }
    }

    /// Context against the in-process mocked ledger.
    pub fn mocked_context(&self) -> DeployContext {
        self.context(self.settings(Endpoint::mocked()))
            .with_poller(ChainPoller::mocked())
    }

    pub fn context(&self, settings: DeploySettings) -> DeployContext {
        let generator = CliProjectGenerator::new(self.zk.display().to_string(), Duration::from_secs(20));
        let keys = CommandKeyGenerator::new(self.keygen.display().to_string(), Vec::new());
        DeployContext::new(settings, Arc::new(generator), Arc::new(keys)).unwrap()
    }

    /// Files left in the fee payer key cache.
    pub fn cached_keys(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.key_cache()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Projects left in the workspace.
    pub fn leftover_projects(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.workspace()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
