//! Operations carried by a transaction
//!
//! Each variant knows its own wire encoding and declares, statically, which
//! of its account fields must be authorized and by which authority.

use serde::ser::{SerializeTuple, Serializer};
use serde::Serialize;

use super::encoding::{ByteWriter, EncodeError};
use super::types::{AccountName, Asset, AuthorityType};

// =============================================================================
// Signature Requirements
// =============================================================================

/// The account field(s) a requirement points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAccounts<'a> {
    Single(&'a AccountName),
    List(&'a [AccountName]),
}

impl<'a> RequiredAccounts<'a> {
    /// Accounts in field order
    pub fn iter(&self) -> impl Iterator<Item = &'a AccountName> + 'a {
        let slice: &'a [AccountName] = match *self {
            RequiredAccounts::Single(account) => std::slice::from_ref(account),
            RequiredAccounts::List(accounts) => accounts,
        };
        slice.iter()
    }
}

/// One signature-required field of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureRequirement<'a> {
    pub authority: AuthorityType,
    pub accounts: RequiredAccounts<'a>,
}

impl<'a> SignatureRequirement<'a> {
    fn single(authority: AuthorityType, account: &'a AccountName) -> Self {
        Self {
            authority,
            accounts: RequiredAccounts::Single(account),
        }
    }

    fn list(authority: AuthorityType, accounts: &'a [AccountName]) -> Self {
        Self {
            authority,
            accounts: RequiredAccounts::List(accounts),
        }
    }
}

// =============================================================================
// Operation Payloads
// =============================================================================

/// Up- or down-vote a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOperation {
    pub voter: AccountName,
    pub author: AccountName,
    pub permlink: String,
    /// Percentage in basis points, -10000..=10000
    pub weight: i16,
}

/// Create or edit a post or reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentOperation {
    /// Empty for top-level posts
    pub parent_author: AccountName,
    /// Category tag for top-level posts
    pub parent_permlink: String,
    pub author: AccountName,
    pub permlink: String,
    pub title: String,
    pub body: String,
    pub json_metadata: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOperation {
    pub from: AccountName,
    pub to: AccountName,
    pub amount: Asset,
    pub memo: String,
}

/// Power up liquid STEEM into vesting shares
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferToVestingOperation {
    pub from: AccountName,
    /// Receiving account; empty means `from`
    pub to: AccountName,
    pub amount: Asset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountWitnessVoteOperation {
    pub account: AccountName,
    pub witness: AccountName,
    pub approve: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteCommentOperation {
    pub author: AccountName,
    pub permlink: String,
}

/// Application-defined JSON payload
///
/// Accounts in `required_auths` sign with their active key, accounts in
/// `required_posting_auths` with their posting key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomJsonOperation {
    pub required_auths: Vec<AccountName>,
    pub required_posting_auths: Vec<AccountName>,
    pub id: String,
    pub json: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRewardBalanceOperation {
    pub account: AccountName,
    pub reward_steem: Asset,
    pub reward_sbd: Asset,
    pub reward_vests: Asset,
}

// =============================================================================
// Operation
// =============================================================================

/// A single protocol operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Vote(VoteOperation),
    Comment(CommentOperation),
    Transfer(TransferOperation),
    TransferToVesting(TransferToVestingOperation),
    AccountWitnessVote(AccountWitnessVoteOperation),
    DeleteComment(DeleteCommentOperation),
    CustomJson(CustomJsonOperation),
    ClaimRewardBalance(ClaimRewardBalanceOperation),
}

impl Operation {
    /// Position of the operation in the protocol's operation variant
    pub fn type_id(&self) -> u64 {
        match self {
            Operation::Vote(_) => 0,
            Operation::Comment(_) => 1,
            Operation::Transfer(_) => 2,
            Operation::TransferToVesting(_) => 3,
            Operation::AccountWitnessVote(_) => 12,
            Operation::DeleteComment(_) => 17,
            Operation::CustomJson(_) => 18,
            Operation::ClaimRewardBalance(_) => 39,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Vote(_) => "vote",
            Operation::Comment(_) => "comment",
            Operation::Transfer(_) => "transfer",
            Operation::TransferToVesting(_) => "transfer_to_vesting",
            Operation::AccountWitnessVote(_) => "account_witness_vote",
            Operation::DeleteComment(_) => "delete_comment",
            Operation::CustomJson(_) => "custom_json",
            Operation::ClaimRewardBalance(_) => "claim_reward_balance",
        }
    }

    /// Signature-required fields in declaration order
    pub fn signature_requirements(&self) -> Vec<SignatureRequirement<'_>> {
        use AuthorityType::{Active, Posting};

        match self {
            Operation::Vote(op) => vec![SignatureRequirement::single(Posting, &op.voter)],
            Operation::Comment(op) => vec![SignatureRequirement::single(Posting, &op.author)],
            Operation::Transfer(op) => vec![SignatureRequirement::single(Active, &op.from)],
            Operation::TransferToVesting(op) => {
                vec![SignatureRequirement::single(Active, &op.from)]
            }
            Operation::AccountWitnessVote(op) => {
                vec![SignatureRequirement::single(Active, &op.account)]
            }
            Operation::DeleteComment(op) => {
                vec![SignatureRequirement::single(Posting, &op.author)]
            }
            Operation::CustomJson(op) => vec![
                SignatureRequirement::list(Active, &op.required_auths),
                SignatureRequirement::list(Posting, &op.required_posting_auths),
            ],
            Operation::ClaimRewardBalance(op) => {
                vec![SignatureRequirement::single(Posting, &op.account)]
            }
        }
    }

    /// Append the canonical encoding: varint type id, then the fields in order
    pub fn encode(&self, writer: &mut ByteWriter) -> Result<(), EncodeError> {
        writer.write_varint(self.type_id());

        match self {
            Operation::Vote(op) => {
                op.voter.encode(writer);
                op.author.encode(writer);
                writer.write_string(&op.permlink);
                writer.write_i16(op.weight);
            }
            Operation::Comment(op) => {
                op.parent_author.encode(writer);
                writer.write_string(&op.parent_permlink);
                op.author.encode(writer);
                writer.write_string(&op.permlink);
                writer.write_string(&op.title);
                writer.write_string(&op.body);
                writer.write_string(&op.json_metadata);
            }
            Operation::Transfer(op) => {
                op.from.encode(writer);
                op.to.encode(writer);
                op.amount.encode(writer, "amount")?;
                writer.write_string(&op.memo);
            }
            Operation::TransferToVesting(op) => {
                op.from.encode(writer);
                op.to.encode(writer);
                op.amount.encode(writer, "amount")?;
            }
            Operation::AccountWitnessVote(op) => {
                op.account.encode(writer);
                op.witness.encode(writer);
                writer.write_bool(op.approve);
            }
            Operation::DeleteComment(op) => {
                op.author.encode(writer);
                writer.write_string(&op.permlink);
            }
            Operation::CustomJson(op) => {
                encode_accounts(writer, &op.required_auths);
                encode_accounts(writer, &op.required_posting_auths);
                writer.write_string(&op.id);
                writer.write_string(&op.json);
            }
            Operation::ClaimRewardBalance(op) => {
                op.account.encode(writer);
                op.reward_steem.encode(writer, "reward_steem")?;
                op.reward_sbd.encode(writer, "reward_sbd")?;
                op.reward_vests.encode(writer, "reward_vests")?;
            }
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer = ByteWriter::new();
        self.encode(&mut writer)?;
        Ok(writer.into_bytes())
    }
}

fn encode_accounts(writer: &mut ByteWriter, accounts: &[AccountName]) {
    writer.write_varint(accounts.len() as u64);
    for account in accounts {
        account.encode(writer);
    }
}

/// JSON form used by the node API: `["<name>", { ...fields }]`
impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.name())?;
        match self {
            Operation::Vote(op) => tuple.serialize_element(op)?,
            Operation::Comment(op) => tuple.serialize_element(op)?,
            Operation::Transfer(op) => tuple.serialize_element(op)?,
            Operation::TransferToVesting(op) => tuple.serialize_element(op)?,
            Operation::AccountWitnessVote(op) => tuple.serialize_element(op)?,
            Operation::DeleteComment(op) => tuple.serialize_element(op)?,
            Operation::CustomJson(op) => tuple.serialize_element(op)?,
            Operation::ClaimRewardBalance(op) => tuple.serialize_element(op)?,
        }
        tuple.end()
    }
}

impl From<VoteOperation> for Operation {
    fn from(op: VoteOperation) -> Self {
        Operation::Vote(op)
    }
}

impl From<CommentOperation> for Operation {
    fn from(op: CommentOperation) -> Self {
        Operation::Comment(op)
    }
}

impl From<TransferOperation> for Operation {
    fn from(op: TransferOperation) -> Self {
        Operation::Transfer(op)
    }
}

impl From<TransferToVestingOperation> for Operation {
    fn from(op: TransferToVestingOperation) -> Self {
        Operation::TransferToVesting(op)
    }
}

impl From<AccountWitnessVoteOperation> for Operation {
    fn from(op: AccountWitnessVoteOperation) -> Self {
        Operation::AccountWitnessVote(op)
    }
}

impl From<DeleteCommentOperation> for Operation {
    fn from(op: DeleteCommentOperation) -> Self {
        Operation::DeleteComment(op)
    }
}

impl From<CustomJsonOperation> for Operation {
    fn from(op: CustomJsonOperation) -> Self {
        Operation::CustomJson(op)
    }
}

impl From<ClaimRewardBalanceOperation> for Operation {
    fn from(op: ClaimRewardBalanceOperation) -> Self {
        Operation::ClaimRewardBalance(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote() -> Operation {
        VoteOperation {
            voter: "xeroc".into(),
            author: "xeroc".into(),
            permlink: "piston".to_string(),
            weight: 10000,
        }
        .into()
    }

    #[test]
    fn test_vote_encoding() {
        assert_eq!(
            hex::encode(vote().to_bytes().unwrap()),
            "00057865726f63057865726f6306706973746f6e1027"
        );
    }

    #[test]
    fn test_transfer_encoding() {
        let op: Operation = TransferOperation {
            from: "foo".into(),
            to: "bar".into(),
            amount: Asset::steem(1000),
            memo: "hi".to_string(),
        }
        .into();

        assert_eq!(
            hex::encode(op.to_bytes().unwrap()),
            "0203666f6f03626172e80300000000000003535445454d0000026869"
        );
    }

    #[test]
    fn test_witness_vote_encoding() {
        let op: Operation = AccountWitnessVoteOperation {
            account: "foo".into(),
            witness: "bar".into(),
            approve: true,
        }
        .into();

        assert_eq!(hex::encode(op.to_bytes().unwrap()), "0c03666f6f0362617201");
    }

    #[test]
    fn test_claim_reward_balance_type_id_is_single_byte() {
        let op: Operation = ClaimRewardBalanceOperation {
            account: "foo".into(),
            reward_steem: Asset::steem(0),
            reward_sbd: Asset::sbd(0),
            reward_vests: Asset::vests(1),
        }
        .into();

        let bytes = op.to_bytes().unwrap();
        assert_eq!(bytes[0], 39);
        // type id + "foo" + three assets
        assert_eq!(bytes.len(), 1 + 4 + 3 * 16);
    }

    #[test]
    fn test_encoding_error_names_field() {
        let op: Operation = ClaimRewardBalanceOperation {
            account: "foo".into(),
            reward_steem: Asset::steem(0),
            reward_sbd: Asset::new(0, 3, "TOOLONGSBD"),
            reward_vests: Asset::vests(0),
        }
        .into();

        assert!(matches!(
            op.to_bytes(),
            Err(EncodeError::SymbolTooLong {
                field: "reward_sbd",
                ..
            })
        ));
    }

    #[test]
    fn test_custom_json_requirements() {
        let op: Operation = CustomJsonOperation {
            required_auths: vec!["alice".into()],
            required_posting_auths: vec!["bob".into(), "carol".into()],
            id: "follow".to_string(),
            json: "{}".to_string(),
        }
        .into();

        let requirements = op.signature_requirements();
        assert_eq!(requirements.len(), 2);
        assert_eq!(requirements[0].authority, AuthorityType::Active);
        assert_eq!(requirements[1].authority, AuthorityType::Posting);

        let posting: Vec<&str> = requirements[1].accounts.iter().map(|a| a.as_str()).collect();
        assert_eq!(posting, vec!["bob", "carol"]);
    }

    #[test]
    fn test_vote_requires_posting() {
        let op = vote();
        let requirements = op.signature_requirements();
        assert_eq!(
            requirements,
            vec![SignatureRequirement {
                authority: AuthorityType::Posting,
                accounts: RequiredAccounts::Single(&AccountName::new("xeroc")),
            }]
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(vote()).unwrap();
        assert_eq!(json[0], "vote");
        assert_eq!(json[1]["voter"], "xeroc");
        assert_eq!(json[1]["weight"], 10000);
    }
}
